//! Writes paginated raster slices as a PDF, one image XObject per page.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::report::pagination::{PageSlice, PageSpec};
use crate::report::raster::Raster;

const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Encodes the slices into PDF bytes. Each slice is placed top-aligned inside
/// the page margins at content width.
pub fn write_pdf(
    raster: &Raster,
    slices: &[PageSlice],
    spec: &PageSpec,
    title: &str,
) -> Result<Vec<u8>, lopdf::Error> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let page_ids = slices
        .iter()
        .map(|slice| add_page(&mut doc, pages_id, raster, slice, spec))
        .collect::<Result<Vec<ObjectId>, lopdf::Error>>()?;

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_ids.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(
            Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    raster: &Raster,
    slice: &PageSlice,
    spec: &PageSpec,
) -> Result<ObjectId, lopdf::Error> {
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => raster.width as i64,
            "Height" => slice.rows() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        raster.rows(slice.row_start, slice.row_end).to_vec(),
    );
    let image_id = doc.add_object(image);

    // PDF origin is bottom-left; pin the slice to the top margin.
    let draw_width = spec.content_width_pt();
    let x = spec.margin_pt;
    let y = spec.height_pt - spec.margin_pt - slice.height_pt;
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw_width.into(),
                    0.into(),
                    0.into(),
                    slice.height_pt.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), spec.width_pt.into(), spec.height_pt.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}
