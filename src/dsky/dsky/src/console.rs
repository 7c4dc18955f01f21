use dsky_core::{Digit, Indicator, RegisterId, RenderableState, Sign};
use dsky_peripherals::segments::{
    get_7seg, get_sign_segments, SEG_A, SEG_B, SEG_C, SEG_D, SEG_E, SEG_F, SEG_G,
};

// Each glyph is three characters wide and three rows tall
const GLYPH_ROWS: usize = 3;

fn glyph(segments: u8) -> [[char; 3]; GLYPH_ROWS] {
    let on = |bit: u8, c: char| if segments & bit != 0 { c } else { ' ' };
    [
        [' ', on(SEG_A, '_'), ' '],
        [on(SEG_F, '|'), on(SEG_G, '_'), on(SEG_B, '|')],
        [on(SEG_E, '|'), on(SEG_D, '_'), on(SEG_C, '|')],
    ]
}

fn sign_glyph(sign: Sign) -> [[char; 3]; GLYPH_ROWS] {
    let segments = get_sign_segments(sign);
    let plus = segments & (SEG_B | SEG_C) != 0;
    let minus = segments & SEG_G != 0;
    [
        [' ', ' ', ' '],
        [' ', if plus { '|' } else { ' ' }, ' '],
        [
            if minus { '-' } else { ' ' },
            if plus { '+' } else if minus { '-' } else { ' ' },
            if minus { '-' } else { ' ' },
        ],
    ]
}

/// Renders a row of glyphs side by side
fn render_row(label: &str, glyphs: &[[[char; 3]; GLYPH_ROWS]]) -> String {
    let mut out = String::new();
    for row in 0..GLYPH_ROWS {
        if row == GLYPH_ROWS - 1 {
            out.push_str(&format!("{:>5} ", label));
        } else {
            out.push_str("      ");
        }
        for g in glyphs {
            out.extend(g[row].iter());
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

fn digit_glyphs(digits: &[Digit]) -> Vec<[[char; 3]; GLYPH_ROWS]> {
    digits.iter().map(|d| glyph(get_7seg(*d))).collect()
}

/// ASCII picture of the electroluminescent panel plus the lit indicators
pub fn render_panel(state: &RenderableState) -> String {
    let mut out = String::new();

    let mut top = digit_glyphs(&state.prog);
    top.push(glyph(0));
    top.extend(digit_glyphs(&state.verb));
    top.push(glyph(0));
    top.extend(digit_glyphs(&state.noun));
    out.push_str(&render_row("P V N", &top));

    for id in RegisterId::ALL.iter() {
        let register = state.register(*id);
        let mut glyphs = vec![sign_glyph(register.sign)];
        glyphs.extend(digit_glyphs(&register.digits));
        out.push_str(&render_row(&format!("{:?}", id), &glyphs));
    }

    let lit: Vec<&str> = Indicator::ALL
        .iter()
        .filter(|i| state.indicator(**i))
        .map(|i| i.label())
        .collect();
    if lit.is_empty() {
        out.push_str("lamps: (none)\n");
    } else {
        out.push_str(&format!("lamps: {}\n", lit.join(", ")));
    }
    out
}
