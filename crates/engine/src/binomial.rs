/// Reduce a full scientific name to its binomial: the first two whitespace
/// tokens joined by a single space. This is a lossy projection that drops
/// authorship and subspecies/variety qualifiers.
///
/// Names with fewer than two tokens reduce to the best partial result (the
/// single token, or the empty string). An empty result is never a valid join
/// key downstream, so short names simply fail to match.
pub fn binomial(name: &str) -> String {
    let mut tokens = name.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(genus), Some(epithet)) => format!("{genus} {epithet}"),
        (Some(genus), None) => genus.to_string(),
        _ => String::new(),
    }
}
