//! Minimal SVG writer shared by the views
//!
//! Numbers are written with at most two decimals and non-finite values are
//! written as `0`, so a document never contains `NaN`.

/// Format a coordinate for an attribute
pub fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Escape text content and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse `#rrggbb` into components
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Darken by `0.7^k`; unparseable colors come back unchanged
pub fn darker(color: &str, k: f64) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let factor = 0.7f64.powf(k);
            let scale = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
            to_hex((scale(r), scale(g), scale(b)))
        }
        None => color.to_string(),
    }
}

/// Linear interpolation between color stops at `t` in `[0, 1]`
pub fn interpolate_stops(stops: &[(u8, u8, u8)], t: f64) -> String {
    match stops.len() {
        0 => return "#000000".to_string(),
        1 => return to_hex(stops[0]),
        _ => {}
    }
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let span = (stops.len() - 1) as f64;
    let pos = t * span;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let local = pos - i as f64;
    let (a, b) = (stops[i], stops[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * local).round() as u8;
    to_hex((mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2)))
}

/// One SVG element with attributes and optional text
#[derive(Debug, Clone)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    text: Option<String>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            text: None,
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Numeric attribute, formatted with [`num`]
    pub fn num(self, name: &'static str, value: f64) -> Self {
        self.attr(name, num(value))
    }

    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.text = Some(content.into());
        self
    }

    fn write(&self, out: &mut String, indent: usize) {
        out.push_str(&"  ".repeat(indent));
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        match &self.text {
            Some(text) => out.push_str(&format!(">{}</{}>\n", escape(text), self.tag)),
            None => out.push_str("/>\n"),
        }
    }
}

pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
    Element::new("line").num("x1", x1).num("y1", y1).num("x2", x2).num("y2", y2)
}

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Element {
    Element::new("rect")
        .num("x", x)
        .num("y", y)
        .num("width", width.max(0.0))
        .num("height", height.max(0.0))
}

pub fn circle(cx: f64, cy: f64, r: f64) -> Element {
    Element::new("circle").num("cx", cx).num("cy", cy).num("r", r.max(0.0))
}

pub fn text(x: f64, y: f64, content: impl Into<String>) -> Element {
    Element::new("text").num("x", x).num("y", y).text(content)
}

pub fn path(d: impl Into<String>) -> Element {
    Element::new("path").attr("d", d)
}

/// `M x,y L x,y ...` through the given points
pub fn polyline_path(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, (x, y))| format!("{}{},{}", if i == 0 { "M" } else { "L" }, num(*x), num(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", num(x), num(y))
}

/// Root `<svg>` document being assembled
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    body: String,
    depth: usize,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            depth: 1,
        }
    }

    pub fn push(&mut self, element: Element) {
        element.write(&mut self.body, self.depth);
    }

    /// Open a `<g>`; close with [`SvgDocument::close_group`]
    pub fn open_group(&mut self, transform: Option<&str>) {
        self.body.push_str(&"  ".repeat(self.depth));
        match transform {
            Some(t) => self.body.push_str(&format!("<g transform=\"{}\">\n", escape(t))),
            None => self.body.push_str("<g>\n"),
        }
        self.depth += 1;
    }

    pub fn close_group(&mut self) {
        if self.depth > 1 {
            self.depth -= 1;
            self.body.push_str(&"  ".repeat(self.depth));
            self.body.push_str("</g>\n");
        }
    }

    /// Raw markup, e.g. `<defs>`
    pub fn raw(&mut self, markup: &str) {
        self.body.push_str(&"  ".repeat(self.depth));
        self.body.push_str(markup);
        self.body.push('\n');
    }

    pub fn finish(mut self) -> String {
        while self.depth > 1 {
            self.close_group();
        }
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = num(self.width),
            h = num(self.height),
            body = self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(1.256), "1.26");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(f64::NAN), "0");
        assert_eq!(num(f64::INFINITY), "0");
        assert_eq!(num(120.5), "120.5");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Tom & \"Jerry\" <3"), "Tom &amp; &quot;Jerry&quot; &lt;3");
    }

    #[test]
    fn test_colors() {
        assert_eq!(parse_hex("#3b82f6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex("blue"), None);
        assert_eq!(darker("#ffffff", 1.0), "#b3b3b3");
        assert_eq!(darker("blue", 1.0), "blue");
        let stops = [(0, 0, 0), (200, 100, 0)];
        assert_eq!(interpolate_stops(&stops, 0.5), "#643200");
        assert_eq!(interpolate_stops(&stops, 2.0), "#c86400");
    }

    #[test]
    fn test_document_nesting() {
        let mut doc = SvgDocument::new(100.0, 50.0);
        doc.open_group(Some(&translate(10.0, 5.0)));
        doc.push(rect(0.0, 0.0, 10.0, -3.0).attr("fill", "#000"));
        doc.push(text(1.0, 2.0, "a<b"));
        let svg = doc.finish();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"50\""));
        assert!(svg.contains("<g transform=\"translate(10,5)\">"));
        assert!(svg.contains("height=\"0\""));
        assert!(svg.contains(">a&lt;b</text>"));
        assert!(svg.trim_end().ends_with("</g>\n</svg>") || svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_polyline_path() {
        assert_eq!(polyline_path(&[(0.0, 1.0), (2.5, 3.0)]), "M0,1 L2.5,3");
        assert_eq!(polyline_path(&[]), "");
    }
}
