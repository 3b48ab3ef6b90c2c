//! 文档上下文判定（结构化预扫 + 标记窗口）
//!
//! 设计要点：
//! - 纯行窗口正则会丢失围栏与标题信息；此处先对全文做一遍逐行结构扫描
//!   （围栏代码块状态、生效标题链、反模式标记位置），再做邻近窗口判定。
//! - 围栏内的行以围栏开头行为窗口锚点：写在示例代码块上方的标注覆盖整个块。
//! - 生效标题含反模式标记时（如 `## Anti-Patterns`），其作用域内（直到
//!   同级或更高级标题）的所有行都视为文档上下文，嵌套子标题一并覆盖。
//! - 判定仍是启发式：标记词表可配置，窗口大小可配置。

use aho_corasick::AhoCorasick;

/// 单行的上下文标注
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LineContext {
    /// 处于围栏代码块内部（不含围栏定界行本身）
    pub(crate) in_fence: bool,
    /// 生效标题链上存在反模式标记
    pub(crate) under_marked_heading: bool,
    /// 本行或锚点窗口内存在反模式标记
    pub(crate) marker_nearby: bool,
}

impl LineContext {
    /// 是否为“文档上下文”（示例/反模式讲解），命中一律抑制
    pub(crate) fn is_documentation(&self) -> bool {
        self.under_marked_heading || self.marker_nearby
    }
}

/// 对整份文件做结构预扫，返回逐行上下文
///
/// `window` 为标记回溯行数：围栏外以当前行为锚点，围栏内以围栏开头行为锚点，
/// 锚点上方 `window` 行以内出现标记即视为邻近。
pub(crate) fn annotate_lines(lines: &[&str], markers: &AhoCorasick, window: usize) -> Vec<LineContext> {
    let n = lines.len();
    let mut ctx = vec![LineContext::default(); n];
    if n == 0 {
        return ctx;
    }

    // 第一遍：标记命中、围栏状态与围栏开头行
    let marker_on_line: Vec<bool> = lines.iter().map(|l| markers.is_match(*l)).collect();
    let mut in_fence = false;
    let mut fence_open: usize = 0; // 当前围栏的定界行下标
    let mut fence_open_of: Vec<Option<usize>> = vec![None; n];

    // 标题作用域栈：(级别, 是否含标记)
    let mut heading_stack: Vec<(usize, bool)> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let is_fence_delim = trimmed.starts_with("```") || trimmed.starts_with("~~~");

        if is_fence_delim {
            if in_fence {
                in_fence = false;
            } else {
                in_fence = true;
                fence_open = i;
            }
        } else if in_fence {
            fence_open_of[i] = Some(fence_open);
        } else if let Some(level) = heading_level(trimmed) {
            // 同级或更高级标题关闭先前作用域
            while heading_stack.last().is_some_and(|&(l, _)| l >= level) {
                heading_stack.pop();
            }
            heading_stack.push((level, marker_on_line[i]));
        }

        ctx[i].in_fence = fence_open_of[i].is_some();
        ctx[i].under_marked_heading = heading_stack.iter().any(|&(_, marked)| marked);
    }

    // 第二遍：锚点窗口判定
    for i in 0..n {
        if marker_on_line[i] {
            ctx[i].marker_nearby = true;
            continue;
        }
        // 围栏内：锚点为围栏开头行，且块内当前行之前出现标记也算
        let anchor = fence_open_of[i].unwrap_or(i);
        let lo = anchor.saturating_sub(window);
        if (lo..=i).any(|j| marker_on_line[j]) {
            ctx[i].marker_nearby = true;
        }
    }

    ctx
}

/// ATX 标题级别（`#` 个数），非标题返回 None
fn heading_level(trimmed: &str) -> Option<usize> {
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    // `#` 后需要空格或行尾才是标题
    match trimmed.as_bytes().get(hashes) {
        None | Some(b' ') | Some(b'\t') => Some(hashes),
        _ => None,
    }
}
