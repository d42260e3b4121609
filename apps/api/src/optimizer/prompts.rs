/// Instruction prepended to every optimization request.
pub const OPTIMIZE_INSTRUCTION: &str = "Rewrite the following resume content so it reads more \
    professional and compelling while staying strictly truthful. \
    Return only the rewritten text, without explanations or commentary:";

pub fn build_optimize_prompt(text: &str) -> String {
    format!("{OPTIMIZE_INSTRUCTION}\n\n{text}")
}
