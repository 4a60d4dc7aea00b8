//! Business code generation.
//!
//! A qualified name is split at its last path separator into package path
//! and function name. Each part is checksummed with CRC-8/SMBUS
//! (polynomial 0x07, no reflection, zero init and xorout) and the two
//! checksums are combined with the line number into `PPPFFFLLL`.

use crate::frame::Frame;
use bc_common::{BusinessCode, RegistryEntry};
use crc::{Crc, CRC_8_SMBUS};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// CRC-8 of raw bytes.
pub fn checksum(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

/// Split a qualified name into `(package_path, function_name)`.
///
/// Both `::` and `.` count as separators; whichever occurs last wins, so
/// dotted import paths keep their dots in the package part. Separators
/// inside `<...>` never split, and a turbofish (`::<T>`) stays with the
/// function it belongs to.
///
/// ```
/// use bc_core::codegen::split_qualified;
/// assert_eq!(split_qualified("my_app::db::load"), ("my_app::db", "load"));
/// assert_eq!(split_qualified("github.com/acme/svc.v2.Handle"), ("github.com/acme/svc.v2", "Handle"));
/// assert_eq!(split_qualified("my_app::load::<my_app::User>"), ("my_app", "load::<my_app::User>"));
/// assert_eq!(split_qualified("main"), ("", "main"));
/// ```
pub fn split_qualified(name: &str) -> (&str, &str) {
    // (end of package, start of function) for each top-level separator.
    let mut splits: Vec<(usize, usize)> = Vec::new();
    let mut prev = None;
    scan_generics(name, |idx, c, depth, _| {
        if depth == 0 {
            match c {
                '.' => splits.push((idx, idx + 1)),
                ':' if prev == Some(':') => splits.push((idx - 1, idx + 1)),
                '<' if splits.last().is_some_and(|&(_, start)| start == idx) => {
                    splits.pop();
                }
                _ => {}
            }
        }
        prev = Some(c);
    });
    match splits.last() {
        Some(&(end, start)) => (&name[..end], &name[start..]),
        None => ("", name),
    }
}

/// `name` with generic argument lists removed.
///
/// Qualified-self prefixes such as `<my_app::Db as my_app::Store>` are kept;
/// only argument lists following a path segment are dropped.
///
/// ```
/// use bc_core::codegen::strip_generic_args;
/// assert_eq!(strip_generic_args("call_once<my_app::run::{closure_env#0}, ()>"), "call_once");
/// assert_eq!(strip_generic_args("<my_app::Db as my_app::Store>::get"), "<my_app::Db as my_app::Store>::get");
/// ```
pub fn strip_generic_args(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    scan_generics(name, |_, c, _, in_args| {
        if !in_args {
            out.push(c);
        }
    });
    out
}

/// Walk `name`, reporting each character with its `<>` nesting depth and
/// whether it belongs to a generic argument list (delimiters included).
fn scan_generics(name: &str, mut visit: impl FnMut(usize, char, usize, bool)) {
    // One flag per open `<`: true for argument lists, false for
    // qualified-self groups.
    let mut open: Vec<bool> = Vec::new();
    let mut prev: Option<char> = None;
    for (idx, c) in name.char_indices() {
        match c {
            '<' => {
                let depth = open.len();
                let args = prev.is_some_and(|p| p.is_alphanumeric() || matches!(p, '_' | ':' | '>'));
                open.push(args);
                visit(idx, c, depth, open.iter().any(|&a| a));
            }
            '>' if prev != Some('-') && !open.is_empty() => {
                let in_args = open.iter().any(|&a| a);
                open.pop();
                visit(idx, c, open.len(), in_args);
            }
            _ => visit(idx, c, open.len(), open.iter().any(|&a| a)),
        }
        prev = Some(c);
    }
}

/// Code for a package path, function name and line.
pub fn business_code(package: &str, function: &str, line: u32) -> BusinessCode {
    BusinessCode::from_parts(
        checksum(package.as_bytes()),
        checksum(function.as_bytes()),
        line,
    )
}

/// Source location a code is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub package: String,
    pub function: String,
    pub line: u32,
}

impl Location {
    pub fn from_frame(frame: &Frame) -> Self {
        let (package, function) = split_qualified(&frame.function);
        Self {
            package: package.to_string(),
            function: function.to_string(),
            line: frame.line,
        }
    }

    pub fn business_code(&self) -> BusinessCode {
        business_code(&self.package, &self.function, self.line)
    }

    /// Registry record for this location under `code`.
    pub fn into_entry(self, code: BusinessCode) -> RegistryEntry {
        RegistryEntry::new(code, self.package, self.function, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc8_check_value() {
        assert_eq!(checksum(b"123456789"), 0xF4);
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn known_segment_checksums() {
        assert_eq!(checksum(b"pkgB"), 76);
        assert_eq!(checksum(b"Bar"), 233);
        assert_eq!(checksum(b"pkgA"), 69);
        assert_eq!(checksum(b"Foo"), 199);
    }

    #[test]
    fn code_from_frame() {
        let location = Location::from_frame(&Frame::new("pkgB.Bar", 20));
        assert_eq!(location.package, "pkgB");
        assert_eq!(location.function, "Bar");
        assert_eq!(location.business_code().as_str(), "076233020");
    }

    #[test]
    fn rust_paths_split_on_last_segment() {
        assert_eq!(
            split_qualified("<my_app::Db as my_app::Store>::get"),
            ("<my_app::Db as my_app::Store>", "get")
        );
        assert_eq!(
            split_qualified("my_app::handlers::{{closure}}"),
            ("my_app::handlers", "{{closure}}")
        );
    }

    #[test]
    fn generic_arguments_never_split() {
        assert_eq!(
            split_qualified("my_app::load::<my_app::User>"),
            ("my_app", "load::<my_app::User>")
        );
        assert_eq!(
            split_qualified("my_app::repo::Repo<my_app::User>::find"),
            ("my_app::repo::Repo<my_app::User>", "find")
        );
        assert_eq!(
            split_qualified("call_once<formatter_nomock::existing_entry_is_kept::{closure_env#0}, ()>"),
            ("", "call_once<formatter_nomock::existing_entry_is_kept::{closure_env#0}, ()>")
        );
        assert_eq!(
            split_qualified("my_app::apply<fn() -> my_app::Out>"),
            ("my_app", "apply<fn() -> my_app::Out>")
        );
    }

    #[test]
    fn strips_only_argument_lists() {
        assert_eq!(
            strip_generic_args("my_app::repo::Repo<my_app::User>::find"),
            "my_app::repo::Repo::find"
        );
        assert_eq!(strip_generic_args("my_app::load::<u8>"), "my_app::load::");
        assert_eq!(
            strip_generic_args("<my_app::Db as my_app::Store<u8>>::get"),
            "<my_app::Db as my_app::Store>::get"
        );
        assert_eq!(strip_generic_args("my_app::apply<fn() -> u8>"), "my_app::apply");
        assert_eq!(strip_generic_args("plain"), "plain");
    }

    #[test]
    fn dotted_versioned_paths() {
        let location = Location::from_frame(&Frame::new("github.com/acme/svc.v2.Handle", 7));
        assert_eq!(location.package, "github.com/acme/svc.v2");
        assert_eq!(location.function, "Handle");
        assert_eq!(location.business_code().as_str(), "028061007");
    }

    #[test]
    fn empty_name_gives_zero_code() {
        let location = Location::from_frame(&Frame::default());
        assert_eq!(location.business_code().as_str(), BusinessCode::ZERO);
    }

    #[test]
    fn entry_matches_location() {
        let location = Location::from_frame(&Frame::new("my_app::handlers.load_user", 12));
        let code = location.business_code();
        let entry = location.into_entry(code.clone());
        assert_eq!(entry.business_code, code);
        assert_eq!(entry.package, "my_app::handlers");
        assert_eq!(entry.function_name, "load_user");
        assert_eq!(entry.line, "12");
        assert_eq!(code.as_str(), "255053012");
    }
}
