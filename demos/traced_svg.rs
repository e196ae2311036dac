use std::error::Error;

use qrism_writer::mesh::decompose;
use qrism_writer::{Elision, Module, ModuleGrid, ModuleKind, OutputFormat, Shape, WriterBuilder};

fn main() -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("./assets")?;
    let matrix = ModuleGrid::from_fn(29, 29, |x, y| {
        Module::new((x / 2 + y / 3) % 2 == 0 || x == y, ModuleKind::Data)
    });

    // Trace the rendered raster back into rectangles
    let writer = WriterBuilder::new()
        .block_width(8)
        .shape(Shape::Circle)
        .format(OutputFormat::SvgTraced)
        .build()?;
    writer.save(&matrix, "./assets/traced.svg")?;
    println!("Traced QR code saved to: assets/traced.svg");

    // Decompose any picture given on the command line
    if let Some(path) = std::env::args().nth(1) {
        let img = image::open(&path)?.to_rgba8();
        let rects = decompose(&img, Elision::default());
        let pixels = img.pixels().filter(|p| !Elision::default().is_background(**p)).count();
        println!("{path}: {pixels} foreground pixels in {} rectangles", rects.len());
    }
    Ok(())
}
