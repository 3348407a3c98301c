//! Plain text record writer
use crate::formats::traits::{OutputMode, TagSink};
use std::io::{self, Write};

/// Width of the `name:` column in labelled records
pub const LABEL_WIDTH: usize = 16;

/// Writes `name:` padded to `LABEL_WIDTH`, the raw value and the separator.
pub struct TextWriter<W: Write> {
    out: W,
    mode: OutputMode,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        TextWriter { out, mode }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TagSink for TextWriter<W> {
    fn emit(&mut self, name: &str, value: &[u8], labelled: bool) -> io::Result<()> {
        if labelled {
            let label = format!("{}:", name);
            write!(self.out, "{:<width$}", label, width = LABEL_WIDTH)?;
        }
        self.out.write_all(value)?;
        self.out.write_all(&[self.mode.separator.as_byte()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::traits::Separator;

    fn render(mode: OutputMode, records: &[(&str, &[u8], bool)]) -> Vec<u8> {
        let mut writer = TextWriter::new(Vec::new(), mode);
        for (name, value, labelled) in records {
            writer.emit(name, value, *labelled).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn labels_are_padded_to_sixteen_columns() {
        let out = render(OutputMode::default(), &[("license", &b"GPL"[..], true)]);
        assert_eq!(out, b"license:        GPL\n");
    }

    #[test]
    fn long_labels_are_not_truncated() {
        let out = render(
            OutputMode::default(),
            &[("a_very_long_field_name", &b"x"[..], true)],
        );
        assert_eq!(out, b"a_very_long_field_name:x\n");
    }

    #[test]
    fn unlabelled_records_are_bare() {
        let out = render(OutputMode::default(), &[("filename", &b"/tmp/loop.ko"[..], false)]);
        assert_eq!(out, b"/tmp/loop.ko\n");
    }

    #[test]
    fn nul_separator() {
        let mode = OutputMode {
            separator: Separator::Nul,
        };
        let out = render(mode, &[("alias", &b"a"[..], true), ("alias", &b"b"[..], true)]);
        assert_eq!(out, b"alias:          a\0alias:          b\0");
    }
}
