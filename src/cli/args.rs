//! Command-line argument parsing for modinfo
use clap::Parser;
use std::path::PathBuf;

use crate::formats::traits::{OutputMode, Separator};
use crate::resolver::{ModuleLayout, DEFAULT_MODULES_DIR};
use crate::tags::{Shortcut, TagSelection};

#[derive(Parser, Debug)]
#[command(name = "modinfo")]
#[command(about = "Show information about Linux kernel modules", long_about = None)]
pub struct Cli {
    /// Module names (shell globs, matched against modules.dep) or module file paths
    #[arg(value_name = "MODULE", required = true)]
    pub modules: Vec<String>,

    /// Shortcut for '-F filename'
    #[arg(short = 'n', long)]
    pub filename: bool,

    /// Shortcut for '-F license'
    #[arg(short = 'l', long)]
    pub license: bool,

    /// Shortcut for '-F author'
    #[arg(short = 'a', long)]
    pub author: bool,

    /// Shortcut for '-F description'
    #[arg(short = 'd', long)]
    pub description: bool,

    /// Shortcut for '-F version'
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Shortcut for '-F alias'
    #[arg(short = 'A', long)]
    pub alias: bool,

    /// Shortcut for '-F srcversion'
    #[arg(short = 's', long)]
    pub srcversion: bool,

    /// Shortcut for '-F depends'
    #[arg(short = 'D', long)]
    pub depends: bool,

    /// Shortcut for '-F uts_release'
    #[arg(short = 'u', long = "uts-release")]
    pub uts_release: bool,

    /// Shortcut for '-F vermagic'
    #[arg(short = 'm', long)]
    pub vermagic: bool,

    /// Shortcut for '-F parm'
    #[arg(short = 'p', long)]
    pub parm: bool,

    /// Shortcut for '-F firmware'
    #[arg(long)]
    pub firmware: bool,

    /// Keyword to look for
    #[arg(short = 'F', long, value_name = "KEYWORD")]
    pub field: Option<String>,

    /// Separate output with NULs
    #[arg(short = '0', long)]
    pub null: bool,

    /// Directory holding the per-release module trees
    #[arg(long, value_name = "DIR", default_value = DEFAULT_MODULES_DIR)]
    pub moddir: PathBuf,

    /// Kernel release to use instead of the running one
    #[arg(short = 'k', long, value_name = "RELEASE")]
    pub kernel_release: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn selection(&self) -> TagSelection {
        let flags = [
            (self.filename, Shortcut::Filename),
            (self.license, Shortcut::License),
            (self.author, Shortcut::Author),
            (self.description, Shortcut::Description),
            (self.version, Shortcut::Version),
            (self.alias, Shortcut::Alias),
            (self.srcversion, Shortcut::Srcversion),
            (self.depends, Shortcut::Depends),
            (self.uts_release, Shortcut::UtsRelease),
            (self.vermagic, Shortcut::Vermagic),
            (self.parm, Shortcut::Parm),
            (self.firmware, Shortcut::Firmware),
        ];
        let shortcuts = flags
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, shortcut)| shortcut);
        TagSelection::new(shortcuts, self.field.clone())
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode {
            separator: if self.null {
                Separator::Nul
            } else {
                Separator::Newline
            },
        }
    }

    pub fn layout(&self) -> ModuleLayout {
        ModuleLayout::with_base_dir(&self.moddir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("modinfo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_selects_everything() {
        let cli = parse(&["loop"]);
        assert_eq!(cli.selection(), TagSelection::all());
        assert_eq!(cli.output_mode().separator, Separator::Newline);
        assert_eq!(cli.layout().base_dir, PathBuf::from("/lib/modules"));
    }

    #[test]
    fn shortcuts_and_field_combine() {
        let cli = parse(&["-la", "-F", "intree", "-0", "loop", "ext4"]);
        let selection = cli.selection();
        assert_eq!(selection.patterns(), vec!["license", "author", "intree"]);
        assert_eq!(cli.output_mode().separator, Separator::Nul);
        assert_eq!(cli.modules, vec!["loop", "ext4"]);
    }

    #[test]
    fn field_alone_is_the_only_tag() {
        let cli = parse(&["-F", "vermagic", "loop"]);
        assert_eq!(cli.selection().len(), 1);
    }

    #[test]
    fn module_argument_is_required() {
        assert!(Cli::try_parse_from(["modinfo", "-l"]).is_err());
    }

    #[test]
    fn overrides() {
        let cli = parse(&["--moddir", "/tmp/mods", "-k", "6.6.0", "--firmware", "x"]);
        assert_eq!(cli.layout().base_dir, PathBuf::from("/tmp/mods"));
        assert_eq!(cli.kernel_release.as_deref(), Some("6.6.0"));
        assert!(cli.selection().contains(Shortcut::Firmware));
    }
}
