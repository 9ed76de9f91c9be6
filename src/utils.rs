/// Path separator in use on the remote host.
///
/// The remote OS is not known in advance, so each transfer call infers the
/// separator once from its first entry and reuses it for the rest of the
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoteSeparator {
    Slash,
    Backslash,
}

impl RemoteSeparator {
    pub(crate) fn as_char(self) -> char {
        match self {
            RemoteSeparator::Slash => '/',
            RemoteSeparator::Backslash => '\\',
        }
    }

    /// Join a directory path and an entry name with this separator.
    pub(crate) fn join(self, base: &str, name: &str) -> String {
        let sep = self.as_char();
        format!("{}{}{}", base.trim_end_matches(sep), sep, name)
    }
}

/// Hidden files follow the dotfile convention on both sides of the transfer.
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Final component of a remote path, accepting either separator style.
pub(crate) fn remote_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_inserts_single_separator() {
        assert_eq!(RemoteSeparator::Slash.join("/data", "a.txt"), "/data/a.txt");
        assert_eq!(RemoteSeparator::Slash.join("/data/", "a.txt"), "/data/a.txt");
        assert_eq!(
            RemoteSeparator::Backslash.join("C:\\incoming\\", "x.txt"),
            "C:\\incoming\\x.txt"
        );
    }

    #[test]
    fn join_handles_root_base() {
        assert_eq!(RemoteSeparator::Slash.join("/", "a.txt"), "/a.txt");
    }

    #[test]
    fn hidden_names_start_with_a_dot() {
        assert!(is_hidden(".hidden"));
        assert!(is_hidden(".config"));
        assert!(!is_hidden("a.txt"));
        assert!(!is_hidden("dir.d"));
    }

    #[test]
    fn basename_takes_the_last_component() {
        assert_eq!(remote_basename("/data/a.txt"), "a.txt");
        assert_eq!(remote_basename("C:\\incoming\\x.txt"), "x.txt");
        assert_eq!(remote_basename("plain.txt"), "plain.txt");
    }
}
