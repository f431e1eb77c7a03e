use image::RgbImage;
use panel_epub::*;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, ZipArchive};

const SINGLE: (u32, u32) = (100, 140);
const DOUBLE: (u32, u32) = (201, 140);

fn write_image(dir: &Path, name: &str, (width, height): (u32, u32)) {
    RgbImage::new(width, height).save(dir.join(name)).unwrap();
}

fn options_for(source: &Path, base: &Path, direction: ReadingDirection, has_cover: bool) -> ConversionOptions {
    let mut options = ConversionOptions::default();
    options.source_dir = source.to_path_buf();
    options.base_path = base.to_path_buf();
    options.title = "Test Book".to_string();
    options.book_id = Some("urn:uuid:00000000-0000-4000-8000-000000000000".to_string());
    options.reading_direction = direction;
    options.has_cover = has_cover;
    options.modified = Some(
        chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&chrono::Utc),
    );
    options
}

fn read_entry(epub: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(epub).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

fn entry_names(epub: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(epub).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// `(idref, side)` of every spine itemref, in order
fn spine_sides(opf: &str) -> Vec<(String, String)> {
    opf.lines()
        .filter(|line| line.contains("<itemref"))
        .map(|line| {
            let attr = |name: &str| {
                let start = line.find(&format!("{}=\"", name)).unwrap() + name.len() + 2;
                let end = start + line[start..].find('"').unwrap();
                line[start..end].to_string()
            };
            let side = attr("properties").trim_start_matches("page-spread-").to_string();
            (attr("idref"), side)
        })
        .collect()
}

fn sides(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(id, side)| (id.to_string(), side.to_string()))
        .collect()
}

async fn convert(source: &Path, base: &Path, direction: ReadingDirection, has_cover: bool) -> ConversionOutput {
    convert_folder(&options_for(source, base, direction, has_cover))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_rtl_single_then_double_inserts_blank() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "001.png", SINGLE);
    write_image(source.path(), "002.png", DOUBLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, false).await;
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");

    assert_eq!(
        spine_sides(&opf),
        sides(&[
            ("page_001_F", "right"),
            ("page_blank_1", "left"),
            ("page_002_a_F", "right"),
            ("page_002_b_F", "left"),
        ])
    );
    assert!(opf.contains(r#"<spine page-progression-direction="rtl" toc="ncx">"#));
    assert!(opf.contains(r#"<meta name="primary-writing-mode" content="horizontal-rl"/>"#));
    assert!(!opf.contains(r#"<meta name="cover""#));

    assert_eq!(output.statistics.source_images, 2);
    assert_eq!(output.statistics.spreads_split, 1);
    assert_eq!(output.statistics.blank_pages_added, 1);
    assert_eq!(output.statistics.spine_entries, 4);

    let blank = read_entry(&output.epub_path, "OEBPS/Text/page_blank_1.xhtml");
    assert!(blank.contains(r#"content="width=1072, height=1448""#));
}

#[tokio::test]
async fn test_rtl_leading_double_needs_no_blank() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "p1.png", DOUBLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, false).await;
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");

    assert_eq!(
        spine_sides(&opf),
        sides(&[("page_p1_a_F", "right"), ("page_p1_b_F", "left")])
    );
    assert_eq!(output.statistics.blank_pages_added, 0);
    assert!(!entry_names(&output.epub_path).contains(&"OEBPS/Images/p1.png".to_string()));
}

#[tokio::test]
async fn test_ltr_single_then_double() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "001.png", SINGLE);
    write_image(source.path(), "002.png", DOUBLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Ltr, false).await;
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");

    assert_eq!(
        spine_sides(&opf),
        sides(&[
            ("page_001_F", "right"),
            ("page_blank_1", "left"),
            ("page_002_a_F", "left"),
            ("page_002_b_F", "right"),
        ])
    );
    assert!(opf.contains(r#"<spine page-progression-direction="ltr" toc="ncx">"#));
}

#[tokio::test]
async fn test_split_halves_cover_the_original() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "p1.png", DOUBLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, false).await;
    let mut archive = ZipArchive::new(File::open(&output.epub_path).unwrap()).unwrap();

    let mut sizes = Vec::new();
    for name in ["OEBPS/Images/p1_a.png", "OEBPS/Images/p1_b.png"] {
        let mut bytes = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut bytes).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        sizes.push((img.width(), img.height()));
    }

    // rtl: `a` is the right crop, which gets the odd column
    assert_eq!(sizes, vec![(101, 140), (100, 140)]);
    assert_eq!(sizes[0].0 + sizes[1].0, DOUBLE.0);

    let page_a = read_entry(&output.epub_path, "OEBPS/Text/page_p1_a_F.xhtml");
    assert!(page_a.contains(r#"content="width=101, height=140""#));
}

#[tokio::test]
async fn test_cover_is_centered_and_declared() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "Cover.jpg", SINGLE);
    write_image(source.path(), "001.png", SINGLE);
    write_image(source.path(), "002.png", SINGLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, true).await;
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");

    // The cover is staged as 0.jpg, so it sorts first
    assert_eq!(
        spine_sides(&opf),
        sides(&[
            ("page_0_F", "center"),
            ("page_001_F", "right"),
            ("page_002_F", "left"),
        ])
    );
    assert!(opf.contains(r#"<meta name="cover" content="cover"/>"#));
    assert!(opf.contains(
        r#"<item id="cover" href="Images/0.jpg" media-type="image/jpeg" properties="cover-image"/>"#
    ));
    assert!(output.statistics.has_cover);
}

#[tokio::test]
async fn test_package_layout_and_compression() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "001.png", SINGLE);
    write_image(source.path(), "002.png", DOUBLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, true).await;
    assert_eq!(output.epub_path, base.path().join("Test Book.epub"));
    assert!(!base.path().join("temp").exists());

    let mut archive = ZipArchive::new(File::open(&output.epub_path).unwrap()).unwrap();
    {
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }
    for i in 1..archive.len() {
        let entry = archive.by_index(i).unwrap();
        assert_eq!(
            entry.compression(),
            CompressionMethod::Deflated,
            "{} should be deflated",
            entry.name()
        );
        assert!(!entry.name().contains('\\'));
    }

    let names = entry_names(&output.epub_path);
    for expected in [
        "META-INF/container.xml",
        "OEBPS/content.opf",
        "OEBPS/toc.ncx",
        "OEBPS/nav.xhtml",
        "OEBPS/Text/style.css",
        "OEBPS/Text/page_001_F.xhtml",
        "OEBPS/Images/001.png",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {}", expected);
    }
    assert_eq!(read_entry(&output.epub_path, "mimetype"), "application/epub+zip");

    let ncx = read_entry(&output.epub_path, "OEBPS/toc.ncx");
    assert_eq!(ncx.matches("<navPoint ").count(), output.statistics.spine_entries);
    let nav = read_entry(&output.epub_path, "OEBPS/nav.xhtml");
    assert!(nav.contains(r#"<a href="Text/page_001_F.xhtml">Test Book</a>"#));
}

#[tokio::test]
async fn test_identical_inputs_give_identical_packages() {
    let source = tempfile::tempdir().unwrap();
    write_image(source.path(), "a.png", SINGLE);
    write_image(source.path(), "b.png", DOUBLE);
    write_image(source.path(), "c.png", SINGLE);

    let first_base = tempfile::tempdir().unwrap();
    let second_base = tempfile::tempdir().unwrap();
    let first = convert(source.path(), first_base.path(), ReadingDirection::Rtl, true).await;
    let second = convert(source.path(), second_base.path(), ReadingDirection::Rtl, true).await;

    assert_eq!(
        read_entry(&first.epub_path, "OEBPS/content.opf"),
        read_entry(&second.epub_path, "OEBPS/content.opf")
    );
    assert_eq!(entry_names(&first.epub_path), entry_names(&second.epub_path));
    assert_eq!(first.statistics, second.statistics);
}

#[tokio::test]
async fn test_undecodable_image_uses_fallback_size() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("broken.jpg"), b"not an image").unwrap();
    write_image(source.path(), "ok.png", SINGLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, false).await;
    let page = read_entry(&output.epub_path, "OEBPS/Text/page_broken_F.xhtml");
    assert!(page.contains(r#"content="width=1046, height=1448""#));
    assert_eq!(output.statistics.single_pages, 2);
    assert_eq!(output.statistics.fallback_sized, 1);
}

#[tokio::test]
async fn test_failed_split_keeps_original_page() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "p1.png", DOUBLE);
    // Occupies the second half's name, so the split is refused
    write_image(source.path(), "p1_b.png", SINGLE);

    let output = convert(source.path(), base.path(), ReadingDirection::Rtl, false).await;
    let names = entry_names(&output.epub_path);
    assert!(names.contains(&"OEBPS/Images/p1.png".to_string()));
    assert!(!names.contains(&"OEBPS/Images/p1_a.png".to_string()));

    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");
    assert_eq!(
        spine_sides(&opf),
        sides(&[("page_p1_F", "right"), ("page_p1_b_F", "left")])
    );

    let stats = &output.statistics;
    assert_eq!(stats.split_failures, 1);
    assert_eq!(stats.spreads_split, 0);
    assert_eq!(stats.single_pages, 2);
    assert_eq!(stats.facing_spreads, 0);
    assert_eq!(stats.spine_entries, 2);
}

#[tokio::test]
async fn test_generated_book_id_is_shared() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "001.png", SINGLE);

    let mut options = options_for(source.path(), base.path(), ReadingDirection::Rtl, false);
    options.book_id = None;
    let output = convert_folder(&options).await.unwrap();

    assert!(output.book_id.starts_with("urn:uuid:"));
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");
    let ncx = read_entry(&output.epub_path, "OEBPS/toc.ncx");
    assert!(opf.contains(&format!(">{}</dc:identifier>", output.book_id)));
    assert!(ncx.contains(&format!(r#"content="{}""#, output.book_id)));
}

#[tokio::test]
async fn test_missing_source_folder_is_fatal() {
    let base = tempfile::tempdir().unwrap();
    let options = options_for(&base.path().join("nope"), base.path(), ReadingDirection::Rtl, true);

    let result = convert_folder(&options).await;
    assert!(matches!(result, Err(EpubError::SourceNotFound(_))));
    assert!(!base.path().join("Test Book.epub").exists());
}

#[tokio::test]
async fn test_preview_matches_conversion() {
    let source = tempfile::tempdir().unwrap();
    let base = tempfile::tempdir().unwrap();
    write_image(source.path(), "cover.png", SINGLE);
    write_image(source.path(), "a1.png", SINGLE);
    write_image(source.path(), "b2.png", DOUBLE);

    let options = options_for(source.path(), base.path(), ReadingDirection::Rtl, true);
    let preview = preview_layout(&options).await.unwrap();
    assert!(!base.path().join("temp").exists());

    let output = convert_folder(&options).await.unwrap();
    let opf = read_entry(&output.epub_path, "OEBPS/content.opf");

    let planned: Vec<(String, String)> = preview
        .spine
        .iter()
        .map(|entry| (entry.idref.clone(), entry.spread.as_str().to_string()))
        .collect();
    assert_eq!(planned, spine_sides(&opf));
    assert_eq!(preview.blank_pages.len(), 1);
}

fn write_cbz(path: &Path, images: &[(&str, (u32, u32))]) {
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, (width, height)) in images {
        let mut bytes = Vec::new();
        RgbImage::new(*width, *height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();
}

#[tokio::test]
async fn test_cbz_batch() {
    let inputs = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();

    let first = inputs.path().join("Vol 1.cbz");
    let second = inputs.path().join("Vol 2.cbz");
    write_cbz(&first, &[("001.png", SINGLE), ("002.png", DOUBLE)]);
    write_cbz(&second, &[("001.png", SINGLE)]);
    let missing = inputs.path().join("missing.cbz");

    let mut template = ConversionOptions::default();
    template.book_id = Some("ignored".to_string());
    template.has_cover = false;

    let outputs = convert_cbz_batch(&[first, missing, second], root.path(), &template)
        .await
        .unwrap();

    let paths: Vec<PathBuf> = outputs.iter().map(|o| o.epub_path.clone()).collect();
    assert_eq!(
        paths,
        vec![root.path().join("Vol 1.epub"), root.path().join("Vol 2.epub")]
    );
    assert_ne!(outputs[0].book_id, outputs[1].book_id);
    assert!(outputs.iter().all(|o| o.book_id.starts_with("urn:uuid:")));
    assert!(!root.path().join("Vol 1_extract").exists());
    assert!(!root.path().join("temp").exists());

    let opf = read_entry(&outputs[0].epub_path, "OEBPS/content.opf");
    assert!(opf.contains(r#"<dc:title id="id">Vol 1</dc:title>"#));
    assert_eq!(outputs[0].statistics.spreads_split, 1);
}

#[tokio::test]
async fn test_cbz_batch_without_inputs() {
    let root = tempfile::tempdir().unwrap();
    let result = convert_cbz_batch(&[], root.path(), &ConversionOptions::default()).await;
    assert!(matches!(result, Err(EpubError::NoInputs)));
}
