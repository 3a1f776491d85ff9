use nexent_common::preview::PreviewMinter;

use super::picked_file::PickedFile;

/// Mints `blob:` URLs with `URL.createObjectURL` and revokes them on release.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectUrlMinter;

#[cfg(target_family = "wasm")]
impl PreviewMinter<PickedFile> for ObjectUrlMinter {
    fn mint(&mut self, file: &PickedFile) -> Result<String, String> {
        web_sys::Url::create_object_url_with_blob(file.file())
            .map_err(|e| format!("createObjectURL failed: {:?}", e))
    }

    fn release(&mut self, url: &str) {
        if let Err(e) = web_sys::Url::revoke_object_url(url) {
            tracing::warn!("revokeObjectURL({url}) failed: {:?}", e);
        }
    }
}

#[cfg(not(target_family = "wasm"))]
impl PreviewMinter<PickedFile> for ObjectUrlMinter {
    fn mint(&mut self, _file: &PickedFile) -> Result<String, String> {
        Err("Object URLs only available in WASM".to_string())
    }

    fn release(&mut self, _url: &str) {}
}
