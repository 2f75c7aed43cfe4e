mod fixture;

use contui::{Buffer, MemoryTerminal, Node, Rect, Style, Terminal, Text};
use pretty_assertions::assert_eq;

fn greeting(text: &str) -> Text {
    let mut node = Text::new();
    node.set_style(Style::default().bold());
    node.write(&[text], "");
    node
}

#[test]
fn golden_first_frame_then_diff() {
    let mut term = MemoryTerminal::new(6, 2);
    let mut buffer = Buffer::for_terminal(&term);

    greeting("hi").render(Rect::new(0, 0, 6, 1), &mut buffer);
    buffer.write(&mut term, None);
    assert_eq!(term.take_output(), fixture::read_unescaped("buffer_first_frame.txt"));

    greeting("yo").render(Rect::new(0, 0, 6, 1), &mut buffer);
    buffer.write(&mut term, None);
    assert_eq!(term.output(), fixture::read_unescaped("buffer_second_frame.txt"));
}

#[test]
fn every_frame_is_a_single_write() {
    let mut term = MemoryTerminal::new(4, 3);
    let mut buffer = Buffer::for_terminal(&term);
    for word in ["ab", "cd", "cd"] {
        greeting(word).render(buffer.area(), &mut buffer);
        buffer.write(&mut term, Some((1, 1)));
    }
    assert_eq!(term.writes().len(), 3);
    assert_eq!(term.writes()[2], "\x1b[1;1H\x1b[0m");
}

#[test]
fn golden_resize_clears_and_repaints() {
    let mut term = MemoryTerminal::new(6, 2);
    let mut buffer = Buffer::for_terminal(&term);
    greeting("hi").render(buffer.area(), &mut buffer);
    buffer.write(&mut term, None);
    term.take_output();

    term.resize(3, 2);
    buffer.resize(Some(usize::from(term.columns())), None);
    buffer.write(&mut term, None);
    assert_eq!(term.output(), fixture::read_unescaped("buffer_resize_frame.txt"));
}

#[test]
fn sub_view_confines_writes() {
    let mut buffer = Buffer::new(5, 3);
    {
        let mut view = buffer.sub(1, 1, 3, 5);
        assert_eq!(view.height(), 2);
        view.fill("#", Style::default());
        assert!(!view.set(3, 0, "x", Style::default()));
    }
    let rows: Vec<String> = buffer
        .rows()
        .map(|row| row.iter().map(|pixel| pixel.symbol.as_str()).collect())
        .collect();
    assert_eq!(rows, ["     ", " ### ", " ### "]);
}
