//! Tag selection and scanning of `.modinfo` style records inside module images
//!
//! A module image stores its metadata as `name=value\0` strings. Each record is
//! preceded by a boundary byte whose low 7 bits are zero (a NUL, or `0x80` in some
//! layouts), which is what separates a real tag from the same bytes appearing by
//! accident in code or other data.
use memchr::memmem;
use std::collections::BTreeSet;

/// Well-known tag names, in the order they are scanned and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shortcut {
    Filename,
    License,
    Author,
    Description,
    Version,
    Alias,
    Srcversion,
    Depends,
    UtsRelease,
    Vermagic,
    Parm,
    Firmware,
}

impl Shortcut {
    pub const ALL: [Shortcut; 12] = [
        Shortcut::Filename,
        Shortcut::License,
        Shortcut::Author,
        Shortcut::Description,
        Shortcut::Version,
        Shortcut::Alias,
        Shortcut::Srcversion,
        Shortcut::Depends,
        Shortcut::UtsRelease,
        Shortcut::Vermagic,
        Shortcut::Parm,
        Shortcut::Firmware,
    ];

    /// Tag name as it appears in the image (and in labelled output)
    pub fn name(self) -> &'static str {
        match self {
            Shortcut::Filename => "filename",
            Shortcut::License => "license",
            Shortcut::Author => "author",
            Shortcut::Description => "description",
            Shortcut::Version => "version",
            Shortcut::Alias => "alias",
            Shortcut::Srcversion => "srcversion",
            Shortcut::Depends => "depends",
            Shortcut::UtsRelease => "uts_release",
            Shortcut::Vermagic => "vermagic",
            Shortcut::Parm => "parm",
            Shortcut::Firmware => "firmware",
        }
    }
}

/// The tags requested for one invocation. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelection {
    shortcuts: BTreeSet<Shortcut>,
    field: Option<String>,
}

impl TagSelection {
    /// Selection from explicit shortcuts and an optional free-form field.
    /// Selecting nothing at all means every shortcut.
    pub fn new<I>(shortcuts: I, field: Option<String>) -> Self
    where
        I: IntoIterator<Item = Shortcut>,
    {
        let mut shortcuts: BTreeSet<Shortcut> = shortcuts.into_iter().collect();
        if shortcuts.is_empty() && field.is_none() {
            shortcuts.extend(Shortcut::ALL);
        }
        TagSelection { shortcuts, field }
    }

    pub fn all() -> Self {
        Self::new(Shortcut::ALL, None)
    }

    pub fn contains(&self, shortcut: Shortcut) -> bool {
        self.shortcuts.contains(&shortcut)
    }

    /// Number of selected tags, the free-form field included.
    pub fn len(&self) -> usize {
        self.shortcuts.len() + usize::from(self.field.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records carry a `name:` label unless exactly one tag was requested.
    pub fn is_labelled(&self) -> bool {
        self.len() != 1
    }

    /// Names to look for inside the image, in output order. `filename` is
    /// not image content and is left out.
    pub fn patterns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .shortcuts
            .iter()
            .filter(|s| **s != Shortcut::Filename)
            .map(|s| s.name())
            .collect();
        names.extend(self.field.as_deref());
        names
    }
}

impl Default for TagSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Read-only view of a module image for tag lookups
pub struct TagScanner<'a> {
    image: &'a [u8],
}

impl<'a> TagScanner<'a> {
    pub fn new(image: &'a [u8]) -> Self {
        TagScanner { image }
    }

    /// Every value tagged `name`, in image order
    pub fn values<'p>(&self, name: &'p str) -> TagValues<'a, 'p> {
        TagValues {
            image: self.image,
            finder: memmem::Finder::new(name.as_bytes()),
            name_len: name.len(),
            pos: if name.is_empty() { self.image.len() } else { 0 },
        }
    }

    /// Values for each pattern in turn; within one pattern, in image order.
    pub fn scan<'p>(&self, patterns: &[&'p str]) -> Vec<(&'p str, &'a [u8])> {
        let mut found = Vec::new();
        for &pattern in patterns {
            found.extend(self.values(pattern).map(|value| (pattern, value)));
        }
        found
    }
}

/// Iterator over the values of one tag name
pub struct TagValues<'a, 'p> {
    image: &'a [u8],
    finder: memmem::Finder<'p>,
    name_len: usize,
    // Start of the window still to be searched.
    pos: usize,
}

impl<'a, 'p> TagValues<'a, 'p> {
    fn is_tag_start(&self, start: usize) -> bool {
        if start == 0 {
            return false;
        }
        let boundary = self.image[start - 1];
        boundary & 0x7f == 0 && self.image.get(start + self.name_len) == Some(&b'=')
    }
}

impl<'a, 'p> Iterator for TagValues<'a, 'p> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.image.len() {
            let start = match self.finder.find(&self.image[self.pos..]) {
                Some(offset) => self.pos + offset,
                None => {
                    self.pos = self.image.len();
                    return None;
                }
            };

            if !self.is_tag_start(start) {
                self.pos = start + 1;
                continue;
            }

            let value_start = start + self.name_len + 1;
            let rest = &self.image[value_start..];
            let value_len = memchr::memchr(0, rest).unwrap_or(rest.len());
            // Skip the terminating NUL too; clamp when the image ends mid-value.
            self.pos = (value_start + value_len + 1).min(self.image.len());
            return Some(&rest[..value_len]);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(image: &'a [u8], name: &str) -> Vec<&'a [u8]> {
        TagScanner::new(image).values(name).collect()
    }

    #[test]
    fn finds_nul_bounded_tag() {
        let image = b"\x7fELF\0license=GPL\0author=Jane Doe\0";
        assert_eq!(values(image, "license"), vec![&b"GPL"[..]]);
        assert_eq!(values(image, "author"), vec![&b"Jane Doe"[..]]);
    }

    #[test]
    fn accepts_high_bit_boundary() {
        let image = b"\x80vermagic=6.1.0 SMP mod_unload\0";
        assert_eq!(values(image, "vermagic"), vec![&b"6.1.0 SMP mod_unload"[..]]);
    }

    #[test]
    fn rejects_match_without_boundary() {
        let image = b"\0xlicense=GPL\0";
        assert!(values(image, "license").is_empty());
    }

    #[test]
    fn rejects_match_without_equals() {
        let image = b"\0license:GPL\0\0licenseGPL\0";
        assert!(values(image, "license").is_empty());
    }

    #[test]
    fn never_accepts_match_at_offset_zero() {
        let image = b"license=GPL\0";
        assert!(values(image, "license").is_empty());
    }

    #[test]
    fn returns_repeated_tags_in_order() {
        let image = b"\0alias=pci:v1\0\0junk\0alias=pci:v2\0alias=usb:v3\0";
        assert_eq!(
            values(image, "alias"),
            vec![&b"pci:v1"[..], &b"pci:v2"[..], &b"usb:v3"[..]]
        );
    }

    #[test]
    fn false_positive_does_not_hide_following_tag() {
        // "parmparm=" : the first "parm" fails the boundary and '=' checks, the
        // overlapping second one is preceded by 'm' and also fails; the real tag follows.
        let image = b"\0parmparm=x\0\0parm=debug:int\0";
        assert_eq!(values(image, "parm"), vec![&b"debug:int"[..]]);
    }

    #[test]
    fn value_may_run_to_end_of_image() {
        let image = b"\0description=truncated";
        assert_eq!(values(image, "description"), vec![&b"truncated"[..]]);
    }

    #[test]
    fn empty_value_is_reported() {
        let image = b"\0depends=\0";
        assert_eq!(values(image, "depends"), vec![&b""[..]]);
    }

    #[test]
    fn missing_tag_yields_nothing() {
        let image = b"\0author=someone\0";
        assert!(values(image, "license").is_empty());
        assert!(values(b"", "license").is_empty());
        assert!(values(image, "").is_empty());
    }

    #[test]
    fn scan_orders_by_pattern_then_position() {
        let image = b"\0depends=b\0license=GPL\0depends=a\0";
        let found = TagScanner::new(image).scan(&["license", "depends"]);
        assert_eq!(
            found,
            vec![
                ("license", &b"GPL"[..]),
                ("depends", &b"b"[..]),
                ("depends", &b"a"[..]),
            ]
        );
    }

    #[test]
    fn empty_selection_means_every_shortcut() {
        let selection = TagSelection::new(Vec::<Shortcut>::new(), None);
        assert_eq!(selection.len(), Shortcut::ALL.len());
        assert!(selection.is_labelled());
        assert_eq!(selection.patterns().first(), Some(&"license"));
        assert_eq!(selection.patterns().last(), Some(&"firmware"));
    }

    #[test]
    fn field_only_selection_is_unlabelled() {
        let selection = TagSelection::new(Vec::<Shortcut>::new(), Some("intree".to_string()));
        assert_eq!(selection.patterns(), vec!["intree"]);
        assert!(!selection.is_labelled());
    }

    #[test]
    fn patterns_follow_enumeration_order_and_skip_filename() {
        let selection = TagSelection::new(
            [Shortcut::Parm, Shortcut::Filename, Shortcut::Author],
            Some("retpoline".to_string()),
        );
        assert_eq!(selection.patterns(), vec!["author", "parm", "retpoline"]);
        assert_eq!(selection.len(), 4);
    }

    #[test]
    fn filename_alone_is_unlabelled() {
        let selection = TagSelection::new([Shortcut::Filename], None);
        assert!(!selection.is_labelled());
        assert!(selection.patterns().is_empty());
        let selection = TagSelection::new([Shortcut::Filename, Shortcut::License], None);
        assert!(selection.is_labelled());
    }
}
