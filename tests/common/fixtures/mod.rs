//! Sample completions used across the integration tests.

/// A typical markdown answer: headings, a code block, a list.
pub const MARKDOWN_RESPONSE: &str = "## Ownership in Rust

Every value has a single owner. When the owner goes out of scope, the value is dropped.

```rust
fn main() {
    let s = String::from(\"hello\");
    takes_ownership(s);
}
```

Key points:
- Moves transfer ownership
- Borrows (`&T`) do not
- Mutable borrows (`&mut T`) are exclusive";

/// Builds a long response of `count` numbered paragraphs.
pub fn long_response(count: usize) -> String {
    (1..=count)
        .map(|i| {
            format!(
                "{i}. {}",
                "The borrow checker enforces aliasing rules at compile time. ".repeat(3)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data() {
        assert!(MARKDOWN_RESPONSE.lines().count() > 5);
        assert_eq!(long_response(3).lines().count(), 3);
    }
}
