use std::path::{Path, PathBuf};

pub fn now_unix() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    dur.as_secs() as i64
}

/// Expand `~` and anchor relative paths at `root`.
pub fn resolve_path(root: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}

/// `12345` -> `12,345`, for the console report.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(15_800), "15,800");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-4_200), "-4,200");
    }

    #[test]
    fn resolves_relative_against_root() {
        let root = Path::new("/srv/school");
        assert_eq!(resolve_path(root, "storage/logs"), PathBuf::from("/srv/school/storage/logs"));
        assert_eq!(resolve_path(root, "/var/log/x"), PathBuf::from("/var/log/x"));
    }
}
