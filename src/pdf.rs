use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};

use crate::constants::{
    PDF_BODY_SIZE, PDF_BODY_X_PT, PDF_BOTTOM_MARGIN_PT, PDF_FIRST_LINE_Y_PT, PDF_LINE_STEP_PT,
    PDF_PAGE_HEIGHT_PT, PDF_PAGE_WIDTH_PT, PDF_TITLE_SIZE, PDF_TITLE_X_PT, PDF_TITLE_Y_PT,
};
use crate::error::ApiError;

/// Renders the aggregated shopping list as a PDF. The first page carries a
/// title; body lines flow down the page and continue on fresh pages once
/// they reach the bottom margin.
pub fn render_shopping_list(lines: &[(String, i64)]) -> Result<Vec<u8>, ApiError> {
    let (doc, page, layer) = PdfDocument::new(
        "Shopping list",
        Mm::from(Pt(PDF_PAGE_WIDTH_PT)),
        Mm::from(Pt(PDF_PAGE_HEIGHT_PT)),
        "layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ApiError::Internal(format!("failed to load pdf font: {e}")))?;

    let mut current = doc.get_page(page).get_layer(layer);
    current.use_text(
        "Shopping list",
        PDF_TITLE_SIZE,
        Mm::from(Pt(PDF_TITLE_X_PT)),
        Mm::from(Pt(PDF_TITLE_Y_PT)),
        &font,
    );

    let mut y = PDF_FIRST_LINE_Y_PT;
    for (index, (name, amount)) in lines.iter().enumerate() {
        if y < PDF_BOTTOM_MARGIN_PT {
            let (page, layer) = doc.add_page(
                Mm::from(Pt(PDF_PAGE_WIDTH_PT)),
                Mm::from(Pt(PDF_PAGE_HEIGHT_PT)),
                "layer 1",
            );
            current = doc.get_page(page).get_layer(layer);
            y = PDF_FIRST_LINE_Y_PT;
        }

        let text = format!("{}. {name} - {amount}", index + 1);
        current.use_text(text, PDF_BODY_SIZE, Mm::from(Pt(PDF_BODY_X_PT)), Mm::from(Pt(y)), &font);
        y -= PDF_LINE_STEP_PT;
    }

    doc.save_to_bytes()
        .map_err(|e| ApiError::Internal(format!("failed to serialize pdf: {e}")))
}

/// How many body lines fit on one page before a break is forced.
pub fn lines_per_page() -> usize {
    let span = PDF_FIRST_LINE_Y_PT - PDF_BOTTOM_MARGIN_PT;
    (span / PDF_LINE_STEP_PT) as usize + 1
}

pub fn page_count(lines: usize) -> usize {
    if lines == 0 {
        return 1;
    }
    lines.div_ceil(lines_per_page())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<(String, i64)> {
        (0..n).map(|i| (format!("Ingredient {i} (g)"), i as i64 + 1)).collect()
    }

    /// Counts `/Type /Page` dictionary entries, skipping the `/Type /Pages`
    /// tree node.
    fn page_objects(bytes: &[u8]) -> usize {
        let needle = b"/Type/Page";
        bytes
            .windows(needle.len() + 1)
            .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
            .count()
    }

    #[test]
    fn page_math() {
        assert_eq!(lines_per_page(), 34);
        assert_eq!(page_count(0), 1);
        assert_eq!(page_count(34), 1);
        assert_eq!(page_count(35), 2);
        assert_eq!(page_count(68), 2);
        assert_eq!(page_count(69), 3);
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_shopping_list(&sample(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_lists_still_render() {
        let bytes = render_shopping_list(&sample(120)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn overflowing_lists_emit_extra_pages() {
        let bytes = render_shopping_list(&sample(40)).unwrap();
        assert_eq!(page_objects(&bytes), page_count(40));
        assert_eq!(page_objects(&bytes), 2);

        let bytes = render_shopping_list(&sample(3)).unwrap();
        assert_eq!(page_objects(&bytes), 1);

        let bytes = render_shopping_list(&sample(69)).unwrap();
        assert_eq!(page_objects(&bytes), 3);
    }

    #[test]
    fn empty_list_renders_title_only_page() {
        let bytes = render_shopping_list(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
