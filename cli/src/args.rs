//! Value parsers for command-line geometry

use delight_core::geometry::Rect;

fn numbers<T: std::str::FromStr>(s: &str, sep: char, count: usize) -> Result<Vec<T>, String> {
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    if parts.len() != count {
        return Err(format!("expected {count} values separated by '{sep}', got {s:?}"));
    }
    parts
        .into_iter()
        .map(|p| p.parse::<T>().map_err(|_| format!("invalid number {p:?} in {s:?}")))
        .collect()
}

/// `WxH`, both non-zero
pub fn parse_viewport(s: &str) -> Result<(u32, u32), String> {
    let v = numbers::<u32>(&s.to_ascii_lowercase(), 'x', 2)?;
    if v[0] == 0 || v[1] == 0 {
        return Err(format!("viewport must be non-empty, got {s:?}"));
    }
    Ok((v[0], v[1]))
}

/// `X,Y`
pub fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let v = numbers::<f32>(s, ',', 2)?;
    Ok((v[0], v[1]))
}

/// `X,Y,W,H`
pub fn parse_rect(s: &str) -> Result<Rect, String> {
    let v = numbers::<f32>(s, ',', 4)?;
    Ok(Rect::new(v[0], v[1], v[2], v[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport() {
        assert_eq!(parse_viewport("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_viewport("800X600"), Ok((800, 600)));
        assert!(parse_viewport("0x600").is_err());
        assert!(parse_viewport("800").is_err());
        assert!(parse_viewport("axb").is_err());
    }

    #[test]
    fn point_and_rect() {
        assert_eq!(parse_point("100, 50.5"), Ok((100.0, 50.5)));
        assert!(parse_point("1,2,3").is_err());
        assert_eq!(
            parse_rect("10,10,100,50"),
            Ok(Rect::new(10.0, 10.0, 100.0, 50.0))
        );
    }
}
