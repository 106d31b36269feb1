//! Attachment field-selection heuristics
//!
//! Attachments are scanned in their original order; the first candidate
//! wins per field.

use crate::model::{Attachment, ImageSize, WallPost};
use crate::normalize::{clean_text, truncate};

/// Link titles at or under this length are treated as generic placeholders
const MIN_LINK_TITLE_CHARS: usize = 15;

/// Fallback text for an article post: the first Link attachment carrying a
/// title, else a description
pub fn text_from_link_attachments(post: &WallPost) -> Option<String> {
    for attachment in &post.attachments {
        if let Attachment::Link { link } = attachment {
            if let Some(title) = non_empty_cleaned(link.title.as_deref()) {
                return Some(title);
            }
            if let Some(description) = non_empty_cleaned(link.description.as_deref()) {
                return Some(description);
            }
        }
    }
    None
}

/// Fallback text for a native post: Video description/title, else Link
/// description/title
pub fn text_from_attachments(post: &WallPost) -> Option<String> {
    for attachment in &post.attachments {
        match attachment {
            Attachment::Video { video } => {
                if let Some(description) = non_empty_cleaned(video.description.as_deref()) {
                    return Some(description);
                }
                if let Some(title) = non_empty_cleaned(video.title.as_deref()) {
                    return Some(title);
                }
            }
            Attachment::Link { link } => {
                if let Some(description) = non_empty_cleaned(link.description.as_deref()) {
                    return Some(description);
                }
                if let Some(title) = non_empty_cleaned(link.title.as_deref()) {
                    return Some(title);
                }
            }
            _ => {}
        }
    }
    None
}

/// The first Link title long enough to be a real headline
pub fn link_title(post: &WallPost) -> Option<String> {
    for attachment in &post.attachments {
        if let Attachment::Link { link } = attachment {
            if let Some(title) = non_empty_cleaned(link.title.as_deref()) {
                if title.chars().count() > MIN_LINK_TITLE_CHARS {
                    return Some(title);
                }
            }
        }
    }
    None
}

/// First sentence of a text: up to and including the first `.` past char
/// position 10, else up to (excluding) the first newline past position 10,
/// else the whole text
pub fn first_sentence(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    if let Some(pos) = chars.iter().position(|&c| c == '.') {
        if pos > 10 {
            return chars[..=pos].iter().collect();
        }
    }

    if let Some(pos) = chars.iter().position(|&c| c == '\n') {
        if pos > 10 {
            return chars[..pos].iter().collect();
        }
    }

    text.to_string()
}

/// Best-effort title: a long-enough Link title, else the first sentence when
/// it reads like a headline, else a Video title, else the truncated body
pub fn generate_title(text: &str, post: &WallPost) -> String {
    if let Some(title) = link_title(post) {
        return title;
    }

    let sentence = first_sentence(text);
    let sentence_len = sentence.chars().count();
    if sentence_len > 20 && sentence_len < 90 {
        return sentence;
    }

    for attachment in &post.attachments {
        if let Attachment::Video { video } = attachment {
            if let Some(title) = video.title.as_deref() {
                if !title.is_empty() {
                    return title.to_string();
                }
            }
        }
    }

    truncate(text, 100)
}

/// The widest image offered by the first attachment that has image data
pub fn best_image(post: &WallPost) -> Option<String> {
    for attachment in &post.attachments {
        let sizes = match attachment {
            Attachment::Video { video } if !video.image.is_empty() => &video.image,
            Attachment::Photo { photo } if !photo.sizes.is_empty() => &photo.sizes,
            Attachment::Link { link } => match &link.photo {
                Some(photo) if !photo.sizes.is_empty() => &photo.sizes,
                _ => continue,
            },
            _ => continue,
        };
        return widest(sizes);
    }
    None
}

fn widest(sizes: &[ImageSize]) -> Option<String> {
    sizes
        .iter()
        .max_by_key(|size| size.width.unwrap_or(0))
        .map(|size| size.url.clone())
}

fn non_empty_cleaned(value: Option<&str>) -> Option<String> {
    let cleaned = clean_text(value?);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}
