/// Characters that cannot appear in a path component on common filesystems
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Makes registry-supplied text safe to use as a single path component
///
/// Every forbidden character is replaced one-for-one with `_`; nothing else
/// is touched.
///
/// # Examples
///
/// ```
/// use via_harvest::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b\\c?d:e<f>g\"h|i"), "a_b_c_d_e_f_g_h_i");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}
