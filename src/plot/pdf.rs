use super::figure::{Axes, Figure, LineStyle, Series, Tick};
use crate::color::{black, frame_gray, white, Color};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Render `figure` as a one-page PDF 1.4 document.
///
/// Text uses the standard Helvetica font, so no font program is embedded.
/// Transparency is expressed with one ExtGState per distinct alpha value.
pub fn render(figure: &Figure) -> Vec<u8> {
    let (width, height) = figure.size_pt();
    let mut canvas = Canvas::default();
    draw_axes(&mut canvas, &figure.axes, width, height);
    write_document(width, height, &canvas)
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

const PAD: f64 = 8.0;
const TICK_LEN: f64 = 3.5;
const TICK_PAD: f64 = 3.5;
const ASCENT: f64 = 0.72;
const DESCENT: f64 = 0.21;

/// Plot area in page coordinates (origin bottom-left).
struct Frame {
    left: f64,
    bottom: f64,
    width: f64,
    height: f64,
    x_limits: (f64, f64),
    y_limits: (f64, f64),
}

impl Frame {
    fn px(&self, x: f64) -> f64 {
        let (lo, hi) = self.x_limits;
        self.left + (x - lo) / (hi - lo) * self.width
    }

    fn py(&self, y: f64) -> f64 {
        let (lo, hi) = self.y_limits;
        self.bottom + (y - lo) / (hi - lo) * self.height
    }

    fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

fn layout(axes: &Axes, x_ticks: &[Tick], y_ticks: &[Tick], width: f64, height: f64) -> Frame {
    let fs = axes.font_size;
    let label_w = |ticks: &[Tick]| {
        ticks
            .iter()
            .filter_map(|t| t.label.as_deref())
            .map(|l| text_width(l, fs))
            .fold(0.0, f64::max)
    };

    let title_h = if axes.title.is_empty() { 0.0 } else { fs * 1.2 + 6.0 };
    let x_label_h = if axes.x_label.is_empty() { 0.0 } else { fs * 1.2 };
    let y_label_w = if axes.y_label.is_empty() { 0.0 } else { fs * 1.2 };
    let last_x_label = x_ticks
        .iter()
        .rev()
        .find_map(|t| t.label.as_deref())
        .map(|l| text_width(l, fs) / 2.0)
        .unwrap_or(0.0);

    let left = PAD + y_label_w + TICK_LEN + TICK_PAD + label_w(y_ticks) + 2.0;
    let bottom = PAD + x_label_h + TICK_LEN + TICK_PAD + fs + 2.0;
    let right = PAD + last_x_label;
    let top = PAD + title_h;

    Frame {
        left,
        bottom,
        width: (width - left - right).max(1.0),
        height: (height - bottom - top).max(1.0),
        x_limits: axes.x_limits,
        y_limits: axes.y_limits,
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

fn draw_axes(canvas: &mut Canvas, axes: &Axes, width: f64, height: f64) {
    let x_ticks = axes.x_ticks();
    let y_ticks = axes.y_ticks();
    let frame = layout(axes, &x_ticks, &y_ticks, width, height);
    let fs = axes.font_size;

    // Series, clipped to the plot area.
    canvas.save();
    canvas.clip_rect(frame.left, frame.bottom, frame.width, frame.height);
    for series in &axes.series {
        draw_series(canvas, &frame, series);
    }
    canvas.restore();

    // Frame and ticks.
    canvas.save();
    canvas.stroke_color(&black());
    canvas.line_width(0.8);
    canvas.rect(frame.left, frame.bottom, frame.width, frame.height);
    canvas.stroke();
    for tick in &x_ticks {
        let x = frame.px(tick.value);
        canvas.move_to(x, frame.bottom);
        canvas.line_to(x, frame.bottom - TICK_LEN);
    }
    for tick in &y_ticks {
        let y = frame.py(tick.value);
        canvas.move_to(frame.left, y);
        canvas.line_to(frame.left - TICK_LEN, y);
    }
    canvas.stroke();
    canvas.restore();

    canvas.fill_color(&black());
    for tick in &x_ticks {
        if let Some(label) = &tick.label {
            let x = frame.px(tick.value) - text_width(label, fs) / 2.0;
            let y = frame.bottom - TICK_LEN - TICK_PAD - fs * ASCENT;
            canvas.text(x, y, fs, label);
        }
    }
    for tick in &y_ticks {
        if let Some(label) = &tick.label {
            let x = frame.left - TICK_LEN - TICK_PAD - text_width(label, fs);
            let y = frame.py(tick.value) - fs * ASCENT / 2.0;
            canvas.text(x, y, fs, label);
        }
    }

    // Axis labels and title.
    if !axes.x_label.is_empty() {
        let x = frame.left + (frame.width - text_width(&axes.x_label, fs)) / 2.0;
        canvas.text(x, PAD + fs * DESCENT, fs, &axes.x_label);
    }
    if !axes.y_label.is_empty() {
        let y = frame.bottom + (frame.height - text_width(&axes.y_label, fs)) / 2.0;
        canvas.text_vertical(PAD + fs * ASCENT, y, fs, &axes.y_label);
    }
    if !axes.title.is_empty() {
        let x = frame.left + (frame.width - text_width(&axes.title, fs)) / 2.0;
        canvas.text(x, frame.top() + 6.0 + fs * DESCENT, fs, &axes.title);
    }

    if let Some(legend_fs) = axes.legend_font_size {
        draw_legend(canvas, &frame, &axes.series, legend_fs);
    }
}

fn draw_series(canvas: &mut Canvas, frame: &Frame, series: &Series) {
    match series {
        Series::Scatter {
            points,
            color,
            marker_size,
            ..
        } => {
            canvas.save();
            canvas.fill_color(color);
            for &[x, y] in points {
                if x.is_finite() && y.is_finite() {
                    canvas.circle(frame.px(x), frame.py(y), marker_size / 2.0);
                    canvas.fill();
                }
            }
            canvas.restore();
        }
        Series::Line {
            points,
            color,
            width,
            style,
            ..
        } => {
            let pts: Vec<(f64, f64)> = points
                .iter()
                .filter(|[x, y]| x.is_finite() && y.is_finite())
                .map(|&[x, y]| (frame.px(x), frame.py(y)))
                .collect();
            draw_polyline(canvas, &pts, color, *width, *style);
        }
    }
}

fn draw_polyline(canvas: &mut Canvas, pts: &[(f64, f64)], color: &Color, width: f64, style: LineStyle) {
    let Some((&(x0, y0), rest)) = pts.split_first() else {
        return;
    };
    canvas.save();
    canvas.stroke_color(color);
    canvas.line_width(width);
    if style == LineStyle::Dashed {
        canvas.dash(&[3.7 * width, 1.6 * width]);
    }
    canvas.move_to(x0, y0);
    for &(x, y) in rest {
        canvas.line_to(x, y);
    }
    canvas.stroke();
    canvas.restore();
}

/// Legend box in the upper-left corner of the plot area.
fn draw_legend(canvas: &mut Canvas, frame: &Frame, series: &[Series], fs: f64) {
    let entries: Vec<(&Series, &str)> = series
        .iter()
        .filter_map(|s| s.label().map(|l| (s, l)))
        .collect();
    if entries.is_empty() {
        return;
    }

    let row_h = fs * 1.4;
    let handle_w = fs * 2.0;
    let inner = fs * 0.4;
    let text_w = entries.iter().map(|(_, l)| text_width(l, fs)).fold(0.0, f64::max);
    let box_w = inner * 3.0 + handle_w + text_w;
    let box_h = inner * 2.0 + row_h * entries.len() as f64;
    let box_left = frame.left + 5.0;
    let box_top = frame.top() - 5.0;

    canvas.save();
    let mut background = white();
    background.alpha = 0.8;
    canvas.fill_color(&background);
    canvas.stroke_color(&frame_gray());
    canvas.line_width(0.8);
    canvas.rect(box_left, box_top - box_h, box_w, box_h);
    canvas.fill_and_stroke();
    canvas.restore();

    for (i, (series, label)) in entries.iter().enumerate() {
        let mid_y = box_top - inner - row_h * (i as f64 + 0.5);
        let handle_x = box_left + inner;
        match series {
            Series::Scatter { color, marker_size, .. } => {
                canvas.save();
                canvas.fill_color(color);
                canvas.circle(handle_x + handle_w / 2.0, mid_y, marker_size / 2.0);
                canvas.fill();
                canvas.restore();
            }
            Series::Line { color, width, style, .. } => {
                draw_polyline(
                    canvas,
                    &[(handle_x, mid_y), (handle_x + handle_w, mid_y)],
                    color,
                    *width,
                    *style,
                );
            }
        }
        canvas.fill_color(&black());
        canvas.text(handle_x + handle_w + inner, mid_y - fs * ASCENT / 2.0, fs, label);
    }
}

// ---------------------------------------------------------------------------
// Canvas – content stream builder
// ---------------------------------------------------------------------------

/// Accumulates PDF content-stream operators plus the graphics states they use.
#[derive(Default)]
struct Canvas {
    ops: String,
    /// Alpha values, indexed by ExtGState number.
    alphas: Vec<f32>,
}

impl Canvas {
    fn op(&mut self, text: std::fmt::Arguments<'_>) {
        self.ops.push_str(&std::fmt::format(text));
        self.ops.push('\n');
    }

    fn save(&mut self) {
        self.ops.push_str("q\n");
    }

    fn restore(&mut self) {
        self.ops.push_str("Q\n");
    }

    fn alpha(&mut self, alpha: f32) {
        if alpha >= 1.0 {
            return;
        }
        let idx = match self.alphas.iter().position(|a| *a == alpha) {
            Some(i) => i,
            None => {
                self.alphas.push(alpha);
                self.alphas.len() - 1
            }
        };
        self.op(format_args!("/GS{idx} gs"));
    }

    fn fill_color(&mut self, c: &Color) {
        self.alpha(c.alpha);
        self.op(format_args!("{} {} {} rg", num(c.red as f64), num(c.green as f64), num(c.blue as f64)));
    }

    fn stroke_color(&mut self, c: &Color) {
        self.alpha(c.alpha);
        self.op(format_args!("{} {} {} RG", num(c.red as f64), num(c.green as f64), num(c.blue as f64)));
    }

    fn line_width(&mut self, w: f64) {
        self.op(format_args!("{} w", num(w)));
    }

    fn dash(&mut self, pattern: &[f64]) {
        let parts: Vec<String> = pattern.iter().map(|v| num(*v)).collect();
        self.op(format_args!("[{}] 0 d", parts.join(" ")));
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} m", num(x), num(y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.op(format_args!("{} {} l", num(x), num(y)));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.op(format_args!("{} {} {} {} re", num(x), num(y), num(w), num(h)));
    }

    fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.rect(x, y, w, h);
        self.ops.push_str("W n\n");
    }

    /// Circle path from four cubic Bézier arcs.
    fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        let k = 0.552_284_75 * r;
        self.move_to(cx + r, cy);
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            num(cx + r), num(cy + k), num(cx + k), num(cy + r), num(cx), num(cy + r)
        ));
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            num(cx - k), num(cy + r), num(cx - r), num(cy + k), num(cx - r), num(cy)
        ));
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            num(cx - r), num(cy - k), num(cx - k), num(cy - r), num(cx), num(cy - r)
        ));
        self.op(format_args!(
            "{} {} {} {} {} {} c",
            num(cx + k), num(cy - r), num(cx + r), num(cy - k), num(cx + r), num(cy)
        ));
        self.ops.push_str("h\n");
    }

    fn stroke(&mut self) {
        self.ops.push_str("S\n");
    }

    fn fill(&mut self) {
        self.ops.push_str("f\n");
    }

    fn fill_and_stroke(&mut self) {
        self.ops.push_str("B\n");
    }

    fn text(&mut self, x: f64, y: f64, size: f64, s: &str) {
        self.op(format_args!(
            "BT /F1 {} Tf {} {} Td {} Tj ET",
            num(size),
            num(x),
            num(y),
            pdf_string(s)
        ));
    }

    /// Text rotated 90° counter-clockwise, baseline starting at `(x, y)`.
    fn text_vertical(&mut self, x: f64, y: f64, size: f64, s: &str) {
        self.op(format_args!(
            "BT /F1 {} Tf 0 1 -1 0 {} {} Tm {} Tj ET",
            num(size),
            num(x),
            num(y),
            pdf_string(s)
        ));
    }
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

fn write_document(width: f64, height: f64, canvas: &Canvas) -> Vec<u8> {
    let mut gs_dict = String::new();
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
    ];
    // ExtGState objects start after the page (3), font (4) and content (5).
    for (i, _) in canvas.alphas.iter().enumerate() {
        gs_dict.push_str(&format!(" /GS{i} {} 0 R", 6 + i));
    }
    objects.push(format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
         /Resources << /Font << /F1 4 0 R >> /ExtGState <<{gs_dict} >> >> /Contents 5 0 R >>",
        num(width),
        num(height)
    ));
    objects.push(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );
    objects.push(format!(
        "<< /Length {} >>\nstream\n{}endstream",
        canvas.ops.len(),
        canvas.ops
    ));
    for alpha in &canvas.alphas {
        let a = num(*alpha as f64);
        objects.push(format!("<< /Type /ExtGState /ca {a} /CA {a} >>"));
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in &offsets {
        xref.push_str(&format!("{off:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}

/// Compact decimal for content streams: at most two fractional digits.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Literal string in WinAnsi encoding; characters outside Latin-1 become `?`.
fn pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('(');
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Advance widths of Helvetica for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Rendered width of `s` in points at `size`.
fn text_width(s: &str, size: f64) -> f64 {
    let units: u32 = s
        .chars()
        .map(|c| match c {
            ' '..='~' => HELVETICA_WIDTHS[c as usize - 32] as u32,
            _ => 556,
        })
        .sum();
    units as f64 * size / 1000.0
}
