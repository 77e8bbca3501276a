//! Widget URI helpers.

/// Suffix of the generated resource module inside a widget or theme folder.
pub const GENERATED_MODULE: &str = "_build-generate_module";

/// Returns the folder part of a widget URI.
///
/// `widgets/Legend/Widget` becomes `widgets/Legend`. A URI without any `/`
/// has no folder and yields an empty string.
pub fn widget_folder(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(i) => &uri[..i],
        None => "",
    }
}

/// Maps a widget URI to the AMD module folder the bundler sees.
pub trait ModuleResolver {
    fn amd_folder(&self, uri: &str) -> String;

    /// Module id of the generated resource module for `uri`.
    fn generated_module(&self, uri: &str) -> String {
        let folder = self.amd_folder(uri);
        if folder.is_empty() {
            GENERATED_MODULE.to_string()
        } else {
            format!("{folder}/{GENERATED_MODULE}")
        }
    }
}

/// Resolves a URI to its folder, relative to the app's module root.
#[derive(Debug, Default, Clone, Copy)]
pub struct FolderModuleResolver;

impl ModuleResolver for FolderModuleResolver {
    fn amd_folder(&self, uri: &str) -> String {
        let folder = widget_folder(uri);
        folder.strip_prefix("./").unwrap_or(folder).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_folder() {
        assert_eq!(widget_folder("widgets/Legend/Widget"), "widgets/Legend");
        assert_eq!(widget_folder("themes/Fold/widgets/Header/Widget"), "themes/Fold/widgets/Header");
        assert_eq!(widget_folder("Widget"), "");
        assert_eq!(widget_folder(""), "");
    }

    #[test]
    fn test_generated_module() {
        let r = FolderModuleResolver;
        assert_eq!(
            r.generated_module("widgets/Legend/Widget"),
            "widgets/Legend/_build-generate_module"
        );
        assert_eq!(
            r.generated_module("./widgets/Splash/Widget"),
            "widgets/Splash/_build-generate_module"
        );
        assert_eq!(r.generated_module("Widget"), "_build-generate_module");
    }
}
