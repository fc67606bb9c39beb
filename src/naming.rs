use rand::Rng;

/// File extensions accepted for upload and serving (lowercase, no dot).
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Extension used when the original filename carries none.
const DEFAULT_EXTENSION: &str = "png";

const SUFFIX_LEN: usize = 8;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Extract the extension of `filename` (after the last dot, lowercased).
pub fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `filename` ends in an allow-listed extension.
pub fn is_allowed_file(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Generate a new storage name for an upload: `comfyui_<8 random chars>.<ext>`.
///
/// The extension is taken from the original filename, lowercased; uploads
/// without one default to `png`. The suffix is drawn from lowercase letters
/// and digits purely for collision avoidance and opacity, not secrecy.
pub fn generate_filename(original: &str) -> String {
    let ext = extension_of(original).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("comfyui_{}.{}", random_suffix(), ext)
}

/// Reduce `name` to a filesystem-safe basename.
///
/// Keeps the component after the last path separator, drops every character
/// outside ASCII alphanumerics and `. - _`, and strips leading dots. Callers
/// that must not tolerate tampering compare the result against the input.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_generated_shape(name: &str, expected_ext: &str) {
        let (stem, ext) = name.rsplit_once('.').expect("generated name has an extension");
        assert_eq!(ext, expected_ext);
        let suffix = stem.strip_prefix("comfyui_").expect("comfyui_ prefix");
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn generated_names_match_pattern() {
        assert_generated_shape(&generate_filename("photo.PNG"), "png");
        assert_generated_shape(&generate_filename("a.b.webp"), "webp");
    }

    #[test]
    fn missing_extension_defaults_to_png() {
        assert_generated_shape(&generate_filename("screenshot"), "png");
    }

    #[test]
    fn suffixes_vary_across_calls() {
        let a = generate_filename("x.png");
        let b = generate_filename("x.png");
        assert_ne!(a, b);
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        assert!(is_allowed_file("cat.JPG"));
        assert!(is_allowed_file("cat.jpeg"));
        assert!(!is_allowed_file("doc.pdf"));
        assert!(!is_allowed_file("noext"));
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("a\\b\\evil.png"), "evil.png");
        assert_eq!(sanitize_filename("..hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("safe_name-1.png"), "safe_name-1.png");
    }

    #[test]
    fn sanitize_drops_unsafe_characters() {
        assert_eq!(sanitize_filename("sp ace?.png"), "space.png");
        assert_eq!(sanitize_filename("..."), "");
    }
}
