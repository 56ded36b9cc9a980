use std::fs;
use std::path::Path;

/// Reads a shader source file into a string.
///
/// On any read error the failure is logged and the empty string is
/// returned; the caller keeps going and the linker rejects the resulting
/// module (an empty WGSL source parses to a module with no entry points).
/// Empty file content is not an error. No retry.
pub fn load_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::error!("failed to open shader file {}: {err}", path.display());
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("whirl-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_yields_empty_source() {
        let source = load_source(Path::new("shaders/does_not_exist.wgsl"));
        assert_eq!(source, "");
    }

    #[test]
    fn file_contents_pass_through_unchanged() {
        let path = scratch_path("roundtrip.wgsl");
        let text = "@fragment\nfn fs_main() -> @location(0) vec4<f32> {\n    return vec4<f32>(1.0);\n}\n";
        fs::write(&path, text).unwrap();

        assert_eq!(load_source(&path), text);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn empty_file_is_not_an_error() {
        let path = scratch_path("empty.wgsl");
        fs::write(&path, "").unwrap();

        assert_eq!(load_source(&path), "");

        let _ = fs::remove_file(&path);
    }
}
