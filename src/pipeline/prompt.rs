//! Analysis prompt construction.

/// Marker used in place of a transcript when the video has no usable audio.
/// Kept non-empty so the prompt's section structure survives.
pub const TRANSCRIPT_MISSING: &str = "Audio topilmadi";

/// Build the three-section analysis prompt around the transcript.
pub fn build_prompt(transcript: &str) -> String {
    let transcript = match transcript.trim() {
        "" => TRANSCRIPT_MISSING,
        t => t,
    };
    format!(
        "Sening vazifang videodagi asosiy voqeani va audioni tahlil qilish. \
         Javobingni quyidagi tuzilmada ber:\n\
         1. **TO'LIQ AUDIO MATN:** {transcript}\n\
         2. **TO'LIQ AUDIO TARJIMA:** Agar audio o'zbekcha bo'lmasa, uni o'zbek tiliga \
         ma'nodosh qilib tarjima qil.\n\
         3. **UMUMIY TAHLIL:** Videodagi mayda vizual detallarga (kiyim, soqol, fon) \
         ortiqcha to'xtalma. Asosiy harakatni londa tushuntir.\n"
    )
}
