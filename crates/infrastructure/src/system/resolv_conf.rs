use dns_proxy_application::ports::HostDnsConfigurator;
use dns_proxy_domain::DomainError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENTRY_MARKER: &str = "# dps-entry";
const COMMENT_MARKER: &str = "# dps-comment";

/// Rewrites a resolv.conf style file so the proxy becomes the only active
/// nameserver, remembering the replaced lines through marker comments.
///
/// The markers are the whole bookkeeping: `restore` works from the file
/// alone, so it also cleans up after a previous run that died without
/// restoring.
pub struct ResolvConfConfigurator {
    path: PathBuf,
    nameserver: String,
}

impl ResolvConfConfigurator {
    pub fn new(path: impl Into<PathBuf>, nameserver: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            nameserver: nameserver.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostDnsConfigurator for ResolvConfConfigurator {
    fn apply(&self) -> Result<(), DomainError> {
        let current = read(&self.path)?;
        let updated = point_to(&current, &self.nameserver);

        if updated != current {
            write(&self.path, &updated)?;
        }
        info!(path = %self.path.display(), nameserver = %self.nameserver, "Host DNS pointed at proxy");
        Ok(())
    }

    fn restore(&self) -> Result<(), DomainError> {
        restore_file(&self.path)
    }
}

/// Puts back the lines replaced by an earlier `apply`, from the markers
/// alone. A file without markers is left untouched.
pub fn restore_file(path: &Path) -> Result<(), DomainError> {
    let current = read(path)?;
    let restored = restore_original(&current);

    if restored != current {
        write(path, &restored)?;
        info!(path = %path.display(), "Host DNS configuration restored");
    } else {
        debug!(path = %path.display(), "Host DNS configuration already original");
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, DomainError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(DomainError::HostDnsConfig(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

fn write(path: &Path, content: &str) -> Result<(), DomainError> {
    std::fs::write(path, content).map_err(|e| {
        DomainError::HostDnsConfig(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn is_nameserver(line: &str) -> bool {
    line.trim_start()
        .strip_prefix("nameserver")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn point_to(content: &str, nameserver: &str) -> String {
    let mut lines = vec![format!("nameserver {} {}", nameserver, ENTRY_MARKER)];

    for line in content.lines() {
        if line.ends_with(ENTRY_MARKER) {
            continue;
        }
        if is_nameserver(line) {
            lines.push(format!("# {} {}", line, COMMENT_MARKER));
        } else {
            lines.push(line.to_string());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn restore_original(content: &str) -> String {
    let mut lines = Vec::new();

    for line in content.lines() {
        if line.ends_with(ENTRY_MARKER) {
            continue;
        }
        match line
            .strip_suffix(COMMENT_MARKER)
            .and_then(|l| l.strip_prefix("# "))
        {
            Some(original) => lines.push(original.trim_end().to_string()),
            None => lines.push(line.to_string()),
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "# managed by hand\nsearch lan\nnameserver 192.168.1.1\nnameserver 8.8.8.8\noptions edns0\n";

    fn configurator(content: &str) -> (tempfile::TempDir, ResolvConfConfigurator) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolv.conf");
        std::fs::write(&path, content).unwrap();
        (dir, ResolvConfConfigurator::new(path, "172.17.0.1"))
    }

    fn contents(c: &ResolvConfConfigurator) -> String {
        std::fs::read_to_string(c.path()).unwrap()
    }

    #[test]
    fn test_apply_puts_proxy_first_and_comments_others() {
        let (_dir, c) = configurator(ORIGINAL);
        c.apply().unwrap();

        assert_eq!(
            contents(&c),
            "nameserver 172.17.0.1 # dps-entry\n\
             # managed by hand\n\
             search lan\n\
             # nameserver 192.168.1.1 # dps-comment\n\
             # nameserver 8.8.8.8 # dps-comment\n\
             options edns0\n"
        );
    }

    #[test]
    fn test_restore_brings_back_original() {
        let (_dir, c) = configurator(ORIGINAL);
        c.apply().unwrap();
        c.restore().unwrap();

        assert_eq!(contents(&c), ORIGINAL);
    }

    #[test]
    fn test_apply_and_restore_are_idempotent() {
        let (_dir, c) = configurator(ORIGINAL);
        c.apply().unwrap();
        let once = contents(&c);
        c.apply().unwrap();
        assert_eq!(contents(&c), once);

        c.restore().unwrap();
        c.restore().unwrap();
        assert_eq!(contents(&c), ORIGINAL);
    }

    #[test]
    fn test_restore_without_apply_leaves_file_untouched() {
        let (_dir, c) = configurator(ORIGINAL);
        c.restore().unwrap();
        assert_eq!(contents(&c), ORIGINAL);
    }

    #[test]
    fn test_stale_entry_from_other_address_is_replaced() {
        let (_dir, c) = configurator("nameserver 10.9.9.9 # dps-entry\n# nameserver 1.1.1.1 # dps-comment\n");
        c.apply().unwrap();

        assert_eq!(
            contents(&c),
            "nameserver 172.17.0.1 # dps-entry\n# nameserver 1.1.1.1 # dps-comment\n"
        );
    }

    #[test]
    fn test_nameserver_prefix_needs_whitespace() {
        assert!(is_nameserver("nameserver 1.1.1.1"));
        assert!(is_nameserver("  nameserver\t::1"));
        assert!(!is_nameserver("nameservers 1.1.1.1"));
        assert!(!is_nameserver("# nameserver 1.1.1.1"));
    }

    #[test]
    fn test_unwritable_path_is_host_dns_error() {
        let c = ResolvConfConfigurator::new("/nonexistent-dir/resolv.conf", "127.0.0.1");
        assert!(matches!(c.apply(), Err(DomainError::HostDnsConfig(_))));
    }
}
