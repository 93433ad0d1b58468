use std::fmt;

/// Number of leading identifier characters kept for the `id` label.
const SHORT_ID_LEN: usize = 12;

/// The label-set key under which a container's metrics are published.
///
/// `name` is the runtime-assigned container name with the leading `/` the
/// daemon prepends stripped off. `short_id` is the first 12 characters of
/// the full container identifier, the same form the Docker CLI prints.
/// Identities are rebuilt from scratch on every sampling pass and never
/// cached across passes.
///
/// # Examples
///
/// ```
/// # use dockerstats::container::ContainerIdentity;
/// let identity = ContainerIdentity::new(
///     "/web",
///     "4e6f1f8d8a3f0c2b9d4e6f1f8d8a3f0c2b9d4e6f1f8d8a3f0c2b9d4e6f1f8d8a",
/// );
/// assert_eq!(identity.name(), "web");
/// assert_eq!(identity.short_id(), "4e6f1f8d8a3f");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerIdentity {
    name: String,
    short_id: String,
}

impl ContainerIdentity {
    /// Builds an identity from the raw name and full identifier the
    /// runtime reports.
    pub fn new(name: &str, id: &str) -> Self {
        let name = name.strip_prefix('/').unwrap_or(name).to_owned();
        let short_id = match id.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => id[..end].to_owned(),
            None => id.to_owned(),
        };

        Self { name, short_id }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_id(&self) -> &str {
        &self.short_id
    }
}

impl fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.short_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leading_slash() {
        let identity = ContainerIdentity::new("/web-1", "abcdef012345beef");
        assert_eq!(identity.name(), "web-1");
    }

    #[test]
    fn test_keeps_name_without_slash() {
        let identity = ContainerIdentity::new("web-1", "abcdef012345beef");
        assert_eq!(identity.name(), "web-1");
    }

    #[test]
    fn test_truncates_id_to_twelve_chars() {
        let identity = ContainerIdentity::new("web", "abcdef0123456789");
        assert_eq!(identity.short_id(), "abcdef012345");
    }

    #[test]
    fn test_short_id_of_short_identifier() {
        let identity = ContainerIdentity::new("web", "abc");
        assert_eq!(identity.short_id(), "abc");
    }

    #[test]
    fn test_display() {
        let identity = ContainerIdentity::new("/web", "abcdef0123456789");
        assert_eq!(identity.to_string(), "web (abcdef012345)");
    }
}
