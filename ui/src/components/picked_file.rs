use nexent_common::upload::ImageFile;

/// A file chosen in the image picker.
#[derive(Clone, Debug)]
pub struct PickedFile {
    name: String,
    content_type: String,
    size: u64,
    #[cfg(target_family = "wasm")]
    file: web_sys::File,
}

impl PickedFile {
    #[cfg(target_family = "wasm")]
    pub fn from_file(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            content_type: file.type_(),
            size: file.size() as u64,
            file,
        }
    }

    #[cfg(target_family = "wasm")]
    pub fn file(&self) -> &web_sys::File {
        &self.file
    }
}

impl ImageFile for PickedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Files currently selected in the `<input type="file">` with `input_id`.
#[cfg(target_family = "wasm")]
pub fn picked_files(input_id: &str) -> Vec<PickedFile> {
    let Some(input) = file_input(input_id) else {
        tracing::warn!("No file input #{input_id}");
        return Vec::new();
    };
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(PickedFile::from_file)
        .collect()
}

/// Clear the picker so choosing the same files again still fires `change`.
#[cfg(target_family = "wasm")]
pub fn reset_picker(input_id: &str) {
    if let Some(input) = file_input(input_id) {
        input.set_value("");
    }
}

#[cfg(target_family = "wasm")]
fn file_input(input_id: &str) -> Option<web_sys::HtmlInputElement> {
    use wasm_bindgen::JsCast;

    web_sys::window()?
        .document()?
        .get_element_by_id(input_id)?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()
}

// Non-WASM stubs for type checking
#[cfg(not(target_family = "wasm"))]
pub fn picked_files(_input_id: &str) -> Vec<PickedFile> {
    Vec::new()
}

#[cfg(not(target_family = "wasm"))]
pub fn reset_picker(_input_id: &str) {}
