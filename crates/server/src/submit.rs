use axum::extract::Multipart;
use intake_core::{parse_quantity, Selection, ValidationError};
use shared::domain::{is_supported_photo, PhotoFile};

/// Raw fields of a `POST /submit` multipart body.
#[derive(Debug, Default)]
pub(crate) struct SubmitForm {
    pub(crate) database: String,
    pub(crate) po_number: String,
    /// Checked items as `(row, name)`.
    pub(crate) items: Vec<(usize, String)>,
    /// Quantity fields as `(row, raw value)`.
    pub(crate) quantities: Vec<(usize, String)>,
    pub(crate) photos: Vec<PhotoFile>,
}

pub(crate) async fn read_submit_form(mut multipart: Multipart) -> Result<SubmitForm, String> {
    let mut form = SubmitForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "database" => form.database = field.text().await.map_err(|e| e.to_string())?,
            "po_number" => form.po_number = field.text().await.map_err(|e| e.to_string())?,
            "photos" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| e.to_string())?;
                // browsers send one empty part when no file was chosen
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.photos.push(PhotoFile::new(filename, bytes.to_vec()));
            }
            other => {
                if let Some(row) = row_index(other, "item_") {
                    let item = field.text().await.map_err(|e| e.to_string())?;
                    form.items.push((row, item));
                } else if let Some(row) = row_index(other, "qty_") {
                    let value = field.text().await.map_err(|e| e.to_string())?;
                    form.quantities.push((row, value));
                }
            }
        }
    }
    Ok(form)
}

fn row_index(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?.parse().ok()
}

impl SubmitForm {
    /// Builds the selection from the checked items. A checked item without a
    /// quantity field counts as 0.
    pub(crate) fn into_selection(self) -> Result<(Selection, Vec<PhotoFile>), ValidationError> {
        if let Some(photo) = self
            .photos
            .iter()
            .find(|photo| !is_supported_photo(&photo.filename))
        {
            return Err(ValidationError::UnsupportedPhoto(photo.filename.clone()));
        }

        let mut selection = Selection::new(self.database.trim(), self.po_number.trim());
        for (row, item) in &self.items {
            let raw = self
                .quantities
                .iter()
                .rev()
                .find(|(quantity_row, _)| quantity_row == row)
                .map(|(_, value)| value.as_str())
                .unwrap_or_default();
            selection.set_quantity(item.as_str(), parse_quantity(item, raw)?);
        }
        Ok((selection, self.photos))
    }
}
