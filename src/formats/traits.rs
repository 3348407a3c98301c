//! Output traits for module tag records
use std::io;

/// Record terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Newline,
    Nul,
}

impl Separator {
    pub fn as_byte(self) -> u8 {
        match self {
            Separator::Newline => b'\n',
            Separator::Nul => b'\0',
        }
    }
}

/// Formatting switches fixed for the whole invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputMode {
    pub separator: Separator,
}

/// Destination for extracted tag records
pub trait TagSink {
    /// Emit one record. `value` is the raw tag value; `labelled` asks for the
    /// `name:` column in front of it.
    fn emit(&mut self, name: &str, value: &[u8], labelled: bool) -> io::Result<()>;
}

impl<T: TagSink + ?Sized> TagSink for &mut T {
    fn emit(&mut self, name: &str, value: &[u8], labelled: bool) -> io::Result<()> {
        (**self).emit(name, value, labelled)
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub records: Vec<(String, Vec<u8>, bool)>,
}

impl TagSink for CollectingSink {
    fn emit(&mut self, name: &str, value: &[u8], labelled: bool) -> io::Result<()> {
        self.records.push((name.to_string(), value.to_vec(), labelled));
        Ok(())
    }
}

impl CollectingSink {
    /// Values emitted for `name`, lossily decoded
    pub fn values_of(&self, name: &str) -> Vec<String> {
        self.records
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, v, _)| String::from_utf8_lossy(v).into_owned())
            .collect()
    }
}
