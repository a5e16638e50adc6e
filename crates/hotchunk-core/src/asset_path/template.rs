//! Filename template rendering: `[id]`, `[name]`, `[hash]`, `[chunkhash]`
//! plus `:N` truncation on the hash forms.

use super::AssetPathError;
use crate::id::ChunkId;

/// The chunk a template is being rendered for, when there is one.
pub(crate) struct ChunkRef<'a> {
    pub id: &'a ChunkId,
    pub hash: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Everything substitution can draw on. `chunk` is `None` for build-wide
/// files such as the hot-update manifest.
pub(crate) struct RenderContext<'a> {
    pub build_hash: &'a str,
    pub chunk: Option<ChunkRef<'a>>,
}

/// Renders one filename template against a context.
pub(crate) fn render(template: &str, ctx: &RenderContext<'_>) -> Result<String, AssetPathError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find(']')
            .ok_or(AssetPathError::UnclosedPlaceholder)?;
        let placeholder = &after[..close];
        out.push_str(&substitute(placeholder, ctx)?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn substitute(placeholder: &str, ctx: &RenderContext<'_>) -> Result<String, AssetPathError> {
    let (key, len) = split_truncation(placeholder)?;
    match key {
        "hash" => Ok(truncate(ctx.build_hash, len)),
        "id" => {
            let chunk = chunk_for(placeholder, ctx)?;
            Ok(chunk.id.to_string())
        }
        "name" => {
            let chunk = chunk_for(placeholder, ctx)?;
            Ok(chunk
                .name
                .map(str::to_string)
                .unwrap_or_else(|| chunk.id.to_string()))
        }
        "chunkhash" => {
            let chunk = chunk_for(placeholder, ctx)?;
            let hash = chunk
                .hash
                .ok_or_else(|| AssetPathError::MissingChunkHash(chunk.id.clone()))?;
            Ok(truncate(hash, len))
        }
        _ => Err(AssetPathError::UnknownPlaceholder(placeholder.to_string())),
    }
}

fn chunk_for<'a>(
    placeholder: &str,
    ctx: &'a RenderContext<'_>,
) -> Result<&'a ChunkRef<'a>, AssetPathError> {
    ctx.chunk
        .as_ref()
        .ok_or_else(|| AssetPathError::PlaceholderNeedsChunk(placeholder.to_string()))
}

fn split_truncation(placeholder: &str) -> Result<(&str, Option<usize>), AssetPathError> {
    match placeholder.split_once(':') {
        None => Ok((placeholder, None)),
        Some((key, len)) => {
            let len = len
                .parse::<usize>()
                .map_err(|_| AssetPathError::BadTruncation(placeholder.to_string()))?;
            Ok((key, Some(len)))
        }
    }
}

fn truncate(hash: &str, len: Option<usize>) -> String {
    match len {
        Some(n) if n < hash.len() => hash[..n].to_string(),
        _ => hash.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(chunk: Option<ChunkRef<'a>>) -> RenderContext<'a> {
        RenderContext {
            build_hash: "0123456789abcdef",
            chunk,
        }
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render("bundle.js", &ctx(None)).unwrap(), "bundle.js");
    }

    #[test]
    fn hash_and_truncated_hash() {
        assert_eq!(
            render("[hash].json", &ctx(None)).unwrap(),
            "0123456789abcdef.json"
        );
        assert_eq!(render("[hash:4].json", &ctx(None)).unwrap(), "0123.json");
        // Truncation longer than the hash keeps the whole hash.
        assert_eq!(
            render("[hash:99]", &ctx(None)).unwrap(),
            "0123456789abcdef"
        );
    }

    #[test]
    fn id_and_name_need_a_chunk() {
        assert!(matches!(
            render("[id].js", &ctx(None)),
            Err(AssetPathError::PlaceholderNeedsChunk(_))
        ));
        let id = ChunkId::Index(5);
        let chunk = ChunkRef {
            id: &id,
            hash: Some("feedface"),
            name: None,
        };
        assert_eq!(
            render("[id].[chunkhash:4].js", &ctx(Some(chunk))).unwrap(),
            "5.feed.js"
        );
    }

    #[test]
    fn unknown_placeholder_rejected() {
        assert!(matches!(
            render("[bogus].js", &ctx(None)),
            Err(AssetPathError::UnknownPlaceholder(_))
        ));
    }

    #[test]
    fn unclosed_placeholder_rejected() {
        assert!(matches!(
            render("[hash.js", &ctx(None)),
            Err(AssetPathError::UnclosedPlaceholder)
        ));
    }

    #[test]
    fn bad_truncation_rejected() {
        assert!(matches!(
            render("[hash:xx].js", &ctx(None)),
            Err(AssetPathError::BadTruncation(_))
        ));
    }
}
