//! Line charts drawn as Typst `path` figures.

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

/// One polyline on a shared x axis. `offset` is the x index of `values[0]`.
pub struct ChartLine<'a> {
    pub label: &'a str,
    pub values: &'a [f64],
    pub offset: usize,
    pub color: &'static str,
    pub dashed: bool,
}

pub fn format_line_chart(lines: &[ChartLine], caption: &str) -> String {
    let span = lines
        .iter()
        .map(|l| l.offset + l.values.len())
        .max()
        .unwrap_or(0);
    if span == 0 {
        return format!("_No data for {}._\n", caption.to_lowercase());
    }

    let all = lines.iter().flat_map(|l| l.values.iter().copied());
    let (min_v, max_v) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_v - min_v;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if span > 1 {
        plot_width / (span - 1) as f64
    } else {
        0.0
    };

    let mut body = String::new();
    body.push_str(&format!(
        "      place(dx: {PADDING:.0}pt, dy: {PADDING:.0}pt, line(start: (0pt, 0pt), end: (0pt, {plot_height:.0}pt)))\n"
    ));
    body.push_str(&format!(
        "      place(dx: {PADDING:.0}pt, dy: {:.0}pt, line(start: (0pt, 0pt), end: ({plot_width:.0}pt, 0pt)))\n",
        HEIGHT - PADDING
    ));

    for line in lines.iter().filter(|l| !l.values.is_empty()) {
        let vertices: Vec<String> = line
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = PADDING + (line.offset + i) as f64 * scale_x;
                let y = HEIGHT - PADDING - (v - min_v) * scale_y;
                format!("({x:.1}pt, {y:.1}pt)")
            })
            .collect();
        let dash = if line.dashed { ", dash: \"dashed\"" } else { "" };
        body.push_str(&format!(
            "      // {}\n      place(path(stroke: (paint: {}, thickness: 1pt{}), {}))\n",
            line.label,
            line.color,
            dash,
            vertices.join(", ")
        ));
    }

    format!(
        "#figure(\n  box(\n    width: {WIDTH:.0}pt,\n    height: {HEIGHT:.0}pt,\n    fill: white,\n    {{\n{body}    }}\n  ),\n  caption: [{caption}]\n)\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chart() {
        let result = format_line_chart(&[], "Portfolio Value");
        assert_eq!(result, "_No data for portfolio value._\n");
    }

    #[test]
    fn single_line_has_dimensions_and_caption() {
        let values = [100.0, 105.0, 110.0];
        let result = format_line_chart(
            &[ChartLine {
                label: "value",
                values: &values,
                offset: 0,
                color: "blue",
                dashed: false,
            }],
            "Portfolio Value",
        );

        assert!(result.contains("#figure"));
        assert!(result.contains("width: 500pt"));
        assert!(result.contains("height: 200pt"));
        assert!(result.contains("caption: [Portfolio Value]"));
        assert!(result.contains("paint: blue"));
        assert!(!result.contains("dashed"));
        // lowest value sits on the x axis, highest at the top of the plot
        assert!(result.contains("(40.0pt, 160.0pt)"));
        assert!(result.contains("(460.0pt, 40.0pt)"));
    }

    #[test]
    fn offset_line_is_dashed_and_shifted() {
        let actual = [10.0, 20.0];
        let predicted = [30.0];
        let result = format_line_chart(
            &[
                ChartLine {
                    label: "actual",
                    values: &actual,
                    offset: 0,
                    color: "blue",
                    dashed: false,
                },
                ChartLine {
                    label: "predicted",
                    values: &predicted,
                    offset: 2,
                    color: "green",
                    dashed: true,
                },
            ],
            "Price Predictions",
        );

        assert!(result.contains("dash: \"dashed\""));
        assert!(result.contains("// predicted"));
        // span 3 => x step 210pt; predicted point at index 2 is at the right edge, top
        assert!(result.contains("(460.0pt, 40.0pt)"));
    }

    #[test]
    fn flat_line_does_not_divide_by_zero() {
        let values = [5.0, 5.0];
        let result = format_line_chart(
            &[ChartLine {
                label: "flat",
                values: &values,
                offset: 0,
                color: "blue",
                dashed: false,
            }],
            "Flat",
        );
        assert!(result.contains("(40.0pt, 160.0pt)"));
        assert!(!result.contains("NaN"));
    }
}
