use tracing::{debug, warn};

/// Build the repository path segment for Harbor artifact URLs.
///
/// The project prefix is stripped and every remaining `/` becomes `%252F`.
/// Harbor's proxy decodes the path once, so the API sees `%2F`. Plain
/// repositories have no inner slashes and pass through unchanged.
pub fn encode_repository_name(full_repo_name: &str, project_name: &str) -> String {
    let repo_path = match full_repo_name
        .strip_prefix(project_name)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        Some(path) => path,
        None => {
            warn!(
                repository = %full_repo_name,
                project = %project_name,
                "Repository name does not start with its project, stripping first segment"
            );
            full_repo_name
                .split_once('/')
                .map_or(full_repo_name, |(_, rest)| rest)
        }
    };

    let encoded = repo_path.replace('/', "%252F");
    debug!(repository = %full_repo_name, project = %project_name, encoded = %encoded, "Encoded repository name");
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_cache_repository() {
        assert_eq!(
            encode_repository_name("nvcr.io/nvidia/pytorch", "nvcr.io"),
            "nvidia%252Fpytorch"
        );
    }

    #[test]
    fn test_plain_repository() {
        assert_eq!(encode_repository_name("custom/my-image", "custom"), "my-image");
    }

    #[test]
    fn test_deeply_nested_repository() {
        assert_eq!(
            encode_repository_name("docker-hub/library/team/app", "docker-hub"),
            "library%252Fteam%252Fapp"
        );
    }

    #[test]
    fn test_prefix_mismatch_falls_back_to_first_segment() {
        assert_eq!(encode_repository_name("other/ns/app", "custom"), "ns%252Fapp");
        // Project name as a bare prefix of the first segment is not a match.
        assert_eq!(encode_repository_name("customer/app", "custom"), "app");
    }

    #[test]
    fn test_name_without_slash() {
        assert_eq!(encode_repository_name("standalone", "custom"), "standalone");
    }
}
