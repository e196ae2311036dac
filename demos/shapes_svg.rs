use std::error::Error;

use qrism_writer::shape::{Assembled, DashedOutline, LiquidBlock, RingFinder};
use qrism_writer::{Module, ModuleGrid, ModuleKind, OutputFormat, Shape, WriterBuilder};

/// 21x21 symbol with the three finder anchors and a scattered data region.
fn sample_matrix() -> ModuleGrid {
    ModuleGrid::from_fn(21, 21, |x, y| {
        let anchor = [(0, 0), (14, 0), (0, 14)]
            .into_iter()
            .find(|&(ax, ay)| (ax..ax + 7).contains(&x) && (ay..ay + 7).contains(&y));
        match anchor {
            Some((ax, ay)) => {
                let d = (x - ax).abs_diff(3).max((y - ay).abs_diff(3));
                Module::new(d != 2, ModuleKind::Finder)
            }
            None => Module::new((x * 31 + y * 17 + x * y) % 5 < 2, ModuleKind::Data),
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("./assets")?;
    let matrix = sample_matrix();

    let shapes = [
        ("square", Shape::Square, OutputFormat::SvgPrimitive),
        ("circle", Shape::Circle, OutputFormat::SvgPrimitive),
        (
            "liquid",
            Shape::custom(Assembled::new(Shape::Square, Shape::custom(LiquidBlock))),
            OutputFormat::SvgPath,
        ),
        (
            "ring",
            Shape::custom(Assembled::new(Shape::custom(RingFinder::default()), Shape::Circle)),
            OutputFormat::SvgPrimitive,
        ),
        ("dashed", Shape::custom(DashedOutline), OutputFormat::SvgPath),
    ];

    for (name, shape, format) in shapes {
        let writer = WriterBuilder::new().block_width(10).shape(shape).format(format).build()?;
        let path = format!("./assets/shape_{name}.svg");
        writer.save(&matrix, &path)?;
        println!("{name} QR code saved to: {path}");
    }
    Ok(())
}
