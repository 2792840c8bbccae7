use super::ContentKind;

/// A system/user prompt pair for one content kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

pub fn system_prompt(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Title => "You are a YouTube title generator.",
        ContentKind::Description => "You are a YouTube description writer. Create engaging, keyword-rich descriptions that hook viewers in the first 2-3 lines.",
        ContentKind::Tags => "You are a YouTube SEO expert specializing in tag optimization.",
        ContentKind::Hashtags => "You are a social media trends expert who identifies trending hashtags.",
        ContentKind::Chapters => "You are a YouTube chapter generator that creates timestamped content segments.",
        ContentKind::Captions => "You are a caption formatter that creates SEO-optimized, accessible captions.",
    }
}

fn instructions(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Title => "Generate a catchy, clear title under 60 characters for a video with this transcript. Place primary keywords at the beginning for better SEO. Incorporate numbers and power words to increase click-through rates. Ensure relevance to video content while avoiding misleading clickbait:",
        ContentKind::Description => "Create a detailed YouTube video description for a video with this transcript. Include:\n1. A hook with keyword-rich opening 2-3 lines\n2. Detailed video summary for YouTube's algorithm\n3. Timestamped chapters for easy navigation\n4. Social media links and website references\n5. Credits and acknowledgments\n6. Optimized hashtags at the end\n\nTranscript:",
        ContentKind::Tags => "Generate a mix of broad and specific tags for maximum reach for a video with this transcript. Include exact match and long-tail keyword variations. Balance relevance with strategic reach optimization:",
        ContentKind::Hashtags => "Generate trending hashtags for a video with this transcript. Combine trending general hashtags with video-specific ones. Research current social media trends across platforms. Balance discovery with relevance:",
        ContentKind::Chapters => "Generate descriptive chapter titles with precise timestamps for a video with this transcript. Automatically detect content segments from the transcript analysis. Format chapters for optimal YouTube integration:",
        ContentKind::Captions => "Format this transcript as SEO-optimized, accessible captions. Ensure proper formatting for YouTube. Include punctuation and speaker identification if applicable:",
    }
}

/// Build the prompt pair for a kind and transcript
pub fn build(kind: ContentKind, transcript: &str) -> Prompt {
    // The description template ends in a label, the others in a colon before a blank line
    let separator = match kind {
        ContentKind::Description => "\n",
        _ => "\n\n",
    };

    Prompt {
        system: system_prompt(kind),
        user: format!("{}{}{}", instructions(kind), separator, transcript),
    }
}
