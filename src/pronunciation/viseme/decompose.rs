use super::tables::DiphthongTable;

const EXPANSION_SEPARATOR: &str = " ";

/// Splits a phoneme token into the symbols that get a mouth shape each.
///
/// Resolution stops at the first rule that applies:
/// 1. the whole token is a known cluster;
/// 2. a known cluster occurs inside the token, tried in the table's scan
///    order. Only the first occurrence is expanded and the remainder of the
///    token stays glued to the neighbouring pieces;
/// 3. runs of phonetic characters, with exact clusters expanded;
/// 4. the token itself.
pub fn decompose(diphthongs: &DiphthongTable, token: &str) -> Vec<String> {
    if let Some(phonemes) = diphthongs.get(token) {
        return phonemes.to_vec();
    }

    if let Some(pieces) = expand_embedded(diphthongs, token) {
        return pieces;
    }

    let runs = phonetic_runs(token);
    if runs.is_empty() {
        return vec![token.to_string()];
    }

    let mut symbols = Vec::with_capacity(runs.len());
    for run in runs {
        match diphthongs.get(run) {
            Some(phonemes) => symbols.extend(phonemes.iter().cloned()),
            None => symbols.push(run.to_string()),
        }
    }
    symbols
}

fn expand_embedded(diphthongs: &DiphthongTable, token: &str) -> Option<Vec<String>> {
    let (cluster, phonemes) = diphthongs
        .scan()
        .find(|(cluster, _)| token.contains(cluster))?;
    let joined = phonemes.join(EXPANSION_SEPARATOR);
    let replaced = token.replacen(cluster, &joined, 1);
    Some(
        replaced
            .split(EXPANSION_SEPARATOR)
            .map(str::to_string)
            .collect(),
    )
}

/// Maximal runs of characters from the phonetic alphabet, in order.
pub fn phonetic_runs(token: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (offset, ch) in token.char_indices() {
        match (is_phonetic(ch), start) {
            (true, None) => start = Some(offset),
            (false, Some(begin)) => {
                runs.push(&token[begin..offset]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        runs.push(&token[begin..]);
    }
    runs
}

fn is_phonetic(ch: char) -> bool {
    matches!(
        ch,
        'a'..='z' | 'ʃ' | 'ʒ' | 'ɹ' | 'ð' | 'θ' | 'ŋ' | 'ɑ' | 'ɪ' | 'ɔ' | 'ə' | 'ʊ' | 'ː'
    )
}
