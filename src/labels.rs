use std::collections::HashMap;
use std::path::Path;

/// Default labels file, looked up in the working directory.
pub const DEFAULT_LABELS_FILE: &str = ".known_branches.yml";

/// Branch name → ordered display tags.
pub type Labels = HashMap<String, Vec<String>>;

/// Read the labels file at `path`.
///
/// A missing file or a YAML error both yield an empty map; labels are only
/// decoration and must never stop the board from starting.
pub fn load_labels(path: &Path) -> Labels {
    let contents = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no labels file");
            return Labels::new();
        }
    };
    parse_labels(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "cannot parse labels file");
        Labels::new()
    })
}

/// Parse labels YAML. An empty document is an empty map.
pub fn parse_labels(yaml: &str) -> Result<Labels, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Labels::new());
    }
    let labels: Option<Labels> = serde_yaml::from_str(yaml)?;
    Ok(labels.unwrap_or_default())
}

/// `name` followed by ` [tag]` for every tag, in file order.
pub fn display_name(name: &str, tags: &[String]) -> String {
    let mut out = name.to_owned();
    for tag in tags {
        out.push_str(" [");
        out.push_str(tag);
        out.push(']');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_with_one_tag() {
        assert_eq!(display_name("feature/x", &["wip".to_owned()]), "feature/x [wip]");
    }

    #[test]
    fn display_name_keeps_tag_order() {
        let tags = vec!["review".to_owned(), "urgent".to_owned()];
        assert_eq!(display_name("fix", &tags), "fix [review] [urgent]");
    }

    #[test]
    fn display_name_without_tags_is_name() {
        assert_eq!(display_name("main", &[]), "main");
    }

    #[test]
    fn parse_mapping() {
        let labels = parse_labels("feature/x:\n  - wip\n  - demo\nfix: [urgent]\n").unwrap();
        assert_eq!(labels["feature/x"], vec!["wip", "demo"]);
        assert_eq!(labels["fix"], vec!["urgent"]);
    }

    #[test]
    fn parse_empty_document() {
        assert!(parse_labels("").unwrap().is_empty());
        assert!(parse_labels("~\n").unwrap().is_empty());
    }

    #[test]
    fn parse_wrong_shape_is_error() {
        assert!(parse_labels("- just\n- a list\n").is_err());
    }

    #[test]
    fn load_missing_file_is_empty() {
        assert!(load_labels(Path::new("/nonexistent/.known_branches.yml")).is_empty());
    }
}
