use std::error::Error;

use image::Rgba;
use qrism_writer::gradient::{ColorStop, LinearGradient};
use qrism_writer::{Module, ModuleGrid, ModuleKind, OutputFormat, QRColors, Shape, WriterBuilder};

fn sample_matrix() -> ModuleGrid {
    ModuleGrid::from_fn(25, 25, |x, y| {
        let anchor = [(0, 0), (18, 0), (0, 18)]
            .into_iter()
            .find(|&(ax, ay)| (ax..ax + 7).contains(&x) && (ay..ay + 7).contains(&y));
        match anchor {
            Some((ax, ay)) => {
                let d = (x - ax).abs_diff(3).max((y - ay).abs_diff(3));
                Module::new(d != 2, ModuleKind::Finder)
            }
            None => Module::new((x ^ y) % 3 == 0 || (x * y) % 7 == 1, ModuleKind::Data),
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("./assets")?;
    let matrix = sample_matrix();

    // Per-kind colors on a tinted background
    let writer = WriterBuilder::new()
        .block_width(12)
        .border(&[24, 12])
        .bg_color_hex("#fdf6e3")
        .qr_colors(QRColors {
            data: Some(Rgba([38, 139, 210, 255])),
            finder: Some(Rgba([211, 54, 130, 255])),
        })
        .shape(Shape::Circle)
        .format(OutputFormat::Png)
        .build()?;
    writer.save(&matrix, "./assets/styled_colors.png")?;
    println!("Per-kind colored QR code saved to: assets/styled_colors.png");

    // Diagonal gradient, with an optional logo and halftone picture passed as arguments
    let gradient = LinearGradient::new(
        45.0,
        [ColorStop::new(0.0, Rgba([255, 0, 0, 255])), ColorStop::new(1.0, Rgba([0, 0, 255, 255]))],
    );
    let mut builder = WriterBuilder::new();
    builder.block_width(12).gradient(gradient).format(OutputFormat::Jpeg);

    let mut args = std::env::args().skip(1);
    if let Some(logo) = args.next() {
        builder.logo_file(logo).logo_fit(true).logo_safe_zone(true);
    }
    if let Some(picture) = args.next() {
        builder.halftone_file(picture);
    }

    builder.build()?.save(&matrix, "./assets/styled_gradient.jpeg")?;
    println!("Gradient QR code saved to: assets/styled_gradient.jpeg");
    Ok(())
}
