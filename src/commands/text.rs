use eyre::Result;

use grabbag::text;

use crate::cli::TextAction;

pub fn run(action: TextAction) -> Result<()> {
    println!("{}", render(action));
    Ok(())
}

fn render(action: TextAction) -> String {
    match action {
        TextAction::Bytes { size } => text::format_bytes(size),
        TextAction::Punctuate { text, punc } => text::punctuate(&text, &punc),
        TextAction::Spaces { text } => text::remove_extra_spaces(&text),
        TextAction::StripHtml { text, repl, keep } => {
            let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
            text::replace_html_tags(&text, &repl, &keep)
        }
        TextAction::Sanitize { text } => text::sanitize_file_name(&text),
    }
}
