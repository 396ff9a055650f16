use std::iter::repeat;
use std::path::{Path, PathBuf};

pub fn find_first_subpath<P: AsRef<Path>, F: Fn(&Path) -> bool>(
    root: impl AsRef<Path>,
    subpaths: &[P],
    search: F,
) -> Option<PathBuf> {
    subpaths
        .iter()
        .zip(repeat(root.as_ref()))
        .map(|(b, a)| a.join(b))
        .find(|it: &PathBuf| search(it))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_existing_subpath_wins() {
        let root = PathBuf::from("/settings");
        let found = find_first_subpath(&root, &["a.yml", "b.yml", "c.yml"], |p| {
            p.ends_with("b.yml") || p.ends_with("c.yml")
        });

        assert_eq!(found, Some(root.join("b.yml")));
    }

    #[test]
    fn nothing_found_yields_none() {
        let found = find_first_subpath("/settings", &["a.yml"], |_| false);
        assert!(found.is_none());
    }
}
