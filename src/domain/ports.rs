use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;

    /// 讀取 UTF-8 文字檔；非 UTF-8 內容回傳 InvalidData 的 IoError
    fn read_to_string(&self, path: &str) -> Result<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path, e),
            )
            .into()
        })
    }
}

/// 擷取、轉換、輸出三階段的批次作業
pub trait Pipeline {
    type Extracted;
    type Transformed;

    fn name(&self) -> &str;
    fn extract(&self) -> Result<Self::Extracted>;
    fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    fn load(&self, result: Self::Transformed) -> Result<String>;
}
