use tracing::{instrument, trace};

/// Renders a JSON pointer as a dotted location, e.g.
/// `/contactMechanisms/addresses/0/city` becomes `contactMechanisms.addresses[0].city`.
/// The document root renders as an empty string.
#[instrument(level = "trace")]
pub fn to_location(json_pointer: &str) -> String {
    let mut location = String::with_capacity(json_pointer.len());

    for token in tokens(json_pointer) {
        if is_index(&token) {
            location.push('[');
            location.push_str(&token);
            location.push(']');
        } else {
            if !location.is_empty() {
                location.push('.');
            }
            location.push_str(&token);
        }
    }

    trace!(location = %location, "Rendered JSON pointer");
    location
}

/// Appends one reference token to a pointer, escaping `~` and `/`.
pub fn child(json_pointer: &str, token: &str) -> String {
    format!(
        "{json_pointer}/{}",
        token.replace('~', "~0").replace('/', "~1")
    )
}

/// Unescaped reference tokens of a pointer, root first.
pub fn tokens(json_pointer: &str) -> impl Iterator<Item = String> + '_ {
    json_pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
}

fn is_index(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
