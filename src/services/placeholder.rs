//! 占位图生成 - 业务能力层
//!
//! AI 图片生成失败时的兜底：按职业名确定性渲染一张 SVG 卡片。
//! 同一职业名多次调用产出字节级相同的 data URI

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use phf::phf_map;

/// 职业卡片配色与图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfessionStyle {
    /// 背景色
    pub bg: &'static str,
    /// 主题色
    pub accent: &'static str,
    /// 图标（emoji）
    pub icon: &'static str,
}

/// 职业 → 样式查找表
static PROFESSION_STYLES: phf::Map<&'static str, ProfessionStyle> = phf_map! {
    "Social Worker" => ProfessionStyle { bg: "#e8f5e8", accent: "#4caf50", icon: "👥" },
    "Doctor" => ProfessionStyle { bg: "#e3f2fd", accent: "#2196f3", icon: "🩺" },
    "Teacher" => ProfessionStyle { bg: "#fff3e0", accent: "#ff9800", icon: "📚" },
    "Software Developer" => ProfessionStyle { bg: "#f3e5f5", accent: "#9c27b0", icon: "💻" },
    "Environmental Scientist" => ProfessionStyle { bg: "#e0f2f1", accent: "#009688", icon: "🌱" },
    "Artist" => ProfessionStyle { bg: "#fce4ec", accent: "#e91e63", icon: "🎨" },
    "Fashion Designer" => ProfessionStyle { bg: "#f8e6ff", accent: "#8e24aa", icon: "✂️" },
    "Engineer" => ProfessionStyle { bg: "#e8eaf6", accent: "#3f51b5", icon: "⚙️" },
    "Scientist" => ProfessionStyle { bg: "#e1f5fe", accent: "#0277bd", icon: "🔬" },
};

/// 查找表未命中时的通用样式
const DEFAULT_STYLE: ProfessionStyle = ProfessionStyle {
    bg: "#f5f5f5",
    accent: "#607d8b",
    icon: "💼",
};

/// 按职业名取样式，未知职业退回通用样式
pub fn style_for(profession: &str) -> ProfessionStyle {
    PROFESSION_STYLES
        .get(profession)
        .copied()
        .unwrap_or(DEFAULT_STYLE)
}

/// 生成职业占位图（SVG data URI）
///
/// 职业名的纯函数：同名调用字节级相同
pub fn create_placeholder_image(profession: &str) -> String {
    let style = style_for(profession);

    let svg = format!(
        r##"<svg width="512" height="384" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="bgGrad" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:{bg};stop-opacity:1" />
      <stop offset="100%" style="stop-color:{accent};stop-opacity:0.2" />
    </linearGradient>
    <linearGradient id="personGrad" x1="0%" y1="0%" x2="0%" y2="100%">
      <stop offset="0%" style="stop-color:{accent};stop-opacity:0.8" />
      <stop offset="100%" style="stop-color:{accent};stop-opacity:0.6" />
    </linearGradient>
  </defs>

  <!-- Background -->
  <rect width="512" height="384" fill="url(#bgGrad)" />

  <!-- Professional figure -->
  <circle cx="256" cy="140" r="45" fill="url(#personGrad)" />
  <rect x="211" y="185" width="90" height="120" fill="url(#personGrad)" rx="8" />

  <!-- Professional icon -->
  <circle cx="320" cy="120" r="25" fill="{accent}" opacity="0.9" />
  <text x="320" y="130" text-anchor="middle" font-size="20" fill="white">{icon}</text>

  <!-- Title -->
  <text x="256" y="340" text-anchor="middle" font-family="Arial, sans-serif" font-size="18" font-weight="bold" fill="{accent}">
    Your Future as a {profession}
  </text>

  <!-- Subtitle -->
  <text x="256" y="365" text-anchor="middle" font-family="Arial, sans-serif" font-size="12" fill="{accent}" opacity="0.8">
    Professional Visualization
  </text>
</svg>"##,
        bg = style.bg,
        accent = style.accent,
        icon = style.icon,
        profession = profession,
    );

    format!(
        "data:image/svg+xml;base64,{}",
        BASE64_STANDARD.encode(svg.as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_profession_style() {
        let style = style_for("Doctor");
        assert_eq!(style.accent, "#2196f3");
        assert_eq!(style.icon, "🩺");
    }

    #[test]
    fn test_unknown_profession_uses_default_style() {
        // 查找表未命中走通用样式，不会 panic
        let style = style_for("Unknown Job");
        assert_eq!(style, DEFAULT_STYLE);

        let uri = create_placeholder_image("Unknown Job");
        assert!(uri.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        // 同一职业名 → 字节级相同的 data URI
        let first = create_placeholder_image("Teacher");
        let second = create_placeholder_image("Teacher");
        assert_eq!(first, second);

        // 不同职业名 → 不同结果
        let other = create_placeholder_image("Artist");
        assert_ne!(first, other);
    }

    #[test]
    fn test_placeholder_embeds_profession_name() {
        let uri = create_placeholder_image("Scientist");
        let b64 = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(BASE64_STANDARD.decode(b64).unwrap()).unwrap();
        assert!(svg.contains("Your Future as a Scientist"));
        assert!(svg.contains("#0277bd"));
    }
}
