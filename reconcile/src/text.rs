//! Normalisation d'adresses et similarité de chaînes
//!
//! La similarité est un ratio Ratcliff/Obershelp (blocs communs les plus
//! longs, récursif), PAS une distance d'édition: même sémantique que le
//! `SequenceMatcher.ratio()` de la stdlib Python, soit
//! `2 × matches / (len(a) + len(b))`.

/// Table ordonnée de substitutions appliquées par [`normalize_address`].
///
/// L'ordre est fixe et significatif: une substitution tardive peut agir sur
/// le texte produit par une substitution précédente. Ne pas réordonner.
const ADDRESS_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("road", "rd"),
    ("street", "st"),
    ("avenue", "ave"),
    ("building", "bldg"),
    ("centre", "center"),
    ("car park", "carpark"),
    (",", ""),
    (".", ""),
];

/// Canonicalise une adresse pour comparaison.
///
/// Minuscules, trim, substitutions de [`ADDRESS_SUBSTITUTIONS`] dans
/// l'ordre, puis effondrement des suites d'espaces en espaces simples.
/// Chaîne vide en entrée -> chaîne vide. Idempotente.
pub fn normalize_address(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut addr = raw.to_lowercase().trim().to_string();
    for (from, to) in ADDRESS_SUBSTITUTIONS {
        addr = addr.replace(from, to);
    }

    addr.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ratio de similarité dans [0, 1], insensible à la casse.
///
/// 1.0 pour deux chaînes identiques (y compris deux chaînes vides),
/// 0.0 pour des alphabets disjoints. Symétrique aux départages près de
/// l'algorithme de recherche de blocs.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }

    let matches = matching_chars(&a_chars, &b_chars);
    2.0 * matches as f64 / total as f64
}

/// Score combiné pondéré: similarité des noms + similarité des adresses
/// normalisées. Les poids sont fournis par l'appelant selon la variante
/// (name-led 0.7/0.3 ou address-led 0.3/0.7).
pub fn combined_score(
    name_a: &str,
    name_b: &str,
    addr_a: &str,
    addr_b: &str,
    name_weight: f64,
    addr_weight: f64,
) -> f64 {
    let name_sim = similarity_ratio(name_a, name_b);
    let addr_sim = similarity_ratio(&normalize_address(addr_a), &normalize_address(addr_b));
    name_sim * name_weight + addr_sim * addr_weight
}

/// Nombre total de caractères appariés par blocs communs (Ratcliff/Obershelp):
/// plus long bloc commun, puis récursion à gauche et à droite du bloc.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (ai, bi, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..ai], &b[..bi])
        + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Plus long bloc commun entre `a` et `b`: retourne (début dans a,
/// début dans b, longueur). Départage déterministe: premier bloc maximal
/// rencontré en balayant a puis b.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    // DP sur une seule ligne: lengths[j] = longueur du bloc se terminant
    // en a[i], b[j]
    let mut lengths = vec![0usize; b.len() + 1];
    let mut best = (0usize, 0usize, 0usize);

    for (i, &ca) in a.iter().enumerate() {
        // Parcours de droite à gauche pour réutiliser la ligne précédente
        for j in (0..b.len()).rev() {
            if ca == b[j] {
                let len = lengths[j] + 1;
                lengths[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            } else {
                lengths[j + 1] = 0;
            }
        }
        lengths[0] = 0;
    }

    best
}
