//! Frame file encodings

use std::io::{self, Write};

use contracts::{Frame, FrameFormat};

/// Encode one frame in the requested format
pub fn write_frame<W: Write>(out: &mut W, frame: &Frame, format: FrameFormat) -> io::Result<()> {
    match format {
        FrameFormat::Csv => write_csv(out, frame),
        FrameFormat::Ply => write_ply(out, frame),
    }
}

/// `x,y,z,intensity` rows, no header
fn write_csv<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    for p in &frame.points {
        writeln!(out, "{},{},{},{}", p.x, p.y, p.z, p.intensity)?;
    }
    Ok(())
}

/// ASCII PLY, one vertex per point
fn write_ply<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "comment frame {}", frame.id)?;
    writeln!(out, "element vertex {}", frame.points.len())?;
    writeln!(out, "property double x")?;
    writeln!(out, "property double y")?;
    writeln!(out, "property double z")?;
    writeln!(out, "property double intensity")?;
    writeln!(out, "end_header")?;
    for p in &frame.points {
        writeln!(out, "{} {} {} {}", p.x, p.y, p.z, p.intensity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Point;

    fn frame() -> Frame {
        let mut frame = Frame::new(7, None);
        frame.points.push(Point {
            x: 0.5,
            y: -1.25,
            z: 2.0,
            intensity: 3.1,
        });
        frame.points.push(Point {
            x: 0.0,
            y: 1.0,
            z: -0.125,
            intensity: 0.0,
        });
        frame
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_frame(&mut out, &frame(), FrameFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5,-1.25,2,3.1\n0,1,-0.125,0\n");
    }

    #[test]
    fn test_csv_rows_parse_back_exactly() {
        let frame = frame();
        let mut out = Vec::new();
        write_frame(&mut out, &frame, FrameFormat::Csv).unwrap();
        let text = String::from_utf8(out).unwrap();
        for (line, p) in text.lines().zip(&frame.points) {
            let values: Vec<f64> = line.split(',').map(|v| v.parse().unwrap()).collect();
            assert_eq!(values, vec![p.x, p.y, p.z, p.intensity]);
        }
    }

    #[test]
    fn test_ply_header() {
        let mut out = Vec::new();
        write_frame(&mut out, &frame(), FrameFormat::Ply).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ply");
        assert_eq!(lines[1], "format ascii 1.0");
        assert!(lines.contains(&"element vertex 2"));
        let body_start = lines.iter().position(|l| *l == "end_header").unwrap() + 1;
        assert_eq!(lines[body_start], "0.5 -1.25 2 3.1");
        assert_eq!(lines.len(), body_start + 2);
    }

    #[test]
    fn test_empty_frame_csv_is_empty() {
        let mut out = Vec::new();
        write_frame(&mut out, &Frame::new(0, None), FrameFormat::Csv).unwrap();
        assert!(out.is_empty());
    }
}
