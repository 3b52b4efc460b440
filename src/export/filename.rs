//! File and archive entry naming.

use std::collections::HashSet;
use url::Url;
use uuid::Uuid;

/// Extension given to synthesized file names
pub const SYNTHESIZED_EXTENSION: &str = "png";

/// Folder every export writes under
pub const IMAGES_FOLDER: &str = "Images";

/// Folder used for a label with nothing usable in it (empty, `.`, `..`)
pub const UNNAMED_FOLDER: &str = "_";

/// Single path component for a label or term.
///
/// Path separators (and `:`, a drive prefix on Windows) become `_`, so
/// `AC/DC` files under `AC_DC` and `/tmp/x` under `_tmp_x`. Labels that are
/// empty or made only of dots map to [`UNNAMED_FOLDER`].
pub fn folder_name(label: &str) -> String {
    let name: String = label
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if name.chars().all(|c| c == '.') {
        return UNNAMED_FOLDER.to_string();
    }
    name
}

/// File name for a content URL: its last path segment, without query string
/// or fragment. URLs with no usable segment get a random `<uuid>.png`.
pub fn derive_file_name(content_url: &str) -> String {
    file_name_from_url(content_url).unwrap_or_else(synthesize_file_name)
}

fn file_name_from_url(content_url: &str) -> Option<String> {
    let path = match Url::parse(content_url.trim()) {
        Ok(url) => url.path().to_string(),
        Err(_) => content_url
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit(['/', '\\']).next().unwrap_or_default();
    let decoded = urlencoding::decode(segment).ok()?;
    let name = decoded.trim();

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }

    Some(name.to_string())
}

fn synthesize_file_name() -> String {
    format!("{}.{}", Uuid::new_v4(), SYNTHESIZED_EXTENSION)
}

/// Hands out archive entry names, suffixing repeats (`img.png`, `img-1.png`, ...)
#[derive(Debug, Default)]
pub(crate) struct EntryNames {
    taken: HashSet<String>,
}

impl EntryNames {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve `Images/<folder_name(label)>/<file_name>`, or the first free
    /// suffixed variant
    pub(crate) fn reserve(&mut self, label: &str, file_name: &str) -> String {
        let folder = folder_name(label);
        let name = entry_name(&folder, file_name);
        if self.taken.insert(name.clone()) {
            return name;
        }

        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
            _ => (file_name, None),
        };

        let mut n = 1;
        loop {
            let candidate = match extension {
                Some(extension) => format!("{}-{}.{}", stem, n, extension),
                None => format!("{}-{}", stem, n),
            };
            let name = entry_name(&folder, &candidate);
            if self.taken.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

fn entry_name(folder: &str, file_name: &str) -> String {
    format!("{}/{}/{}", IMAGES_FOLDER, folder, file_name)
}
