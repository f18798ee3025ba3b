//! Resource name normalization for values keys

/// Turn a kebab-case name into the camelCase key used in `values.yaml`
///
/// Each `-` is dropped and the character after it upper-cased, unless it is
/// already not lowercase. A trailing `-` is dropped.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();

    while let Some(c) = chars.next() {
        if c != '-' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some(next) if next.is_lowercase() => out.extend(next.to_uppercase()),
            Some(next) => out.push(next),
            None => break,
        }
    }

    out
}
