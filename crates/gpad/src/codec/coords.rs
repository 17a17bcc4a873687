//! `coords`: homogeneous coordinates plus optional direction vectors.
//!
//! ```text
//! coords: x y [z [w]] [v=vx vy vz [vw]] [w=wx wy wz [ww]]
//! ```
//!
//! `z` and `w` default to `1.0`, `vw` and `ww` to `0.0`. A `v=`/`w=` token
//! opens a group that collects the numbers following it.

use super::{get, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy)]
pub struct CoordsCodec;

#[derive(Clone, Copy, PartialEq)]
enum Group {
    Point,
    V,
    W,
}

impl Group {
    fn keys(self) -> [&'static str; 4] {
        match self {
            Group::Point => ["x", "y", "z", "w"],
            Group::V => ["vx", "vy", "vz", "vw"],
            Group::W => ["wx", "wy", "wz", "ww"],
        }
    }

    fn min_len(self) -> usize {
        match self {
            Group::Point => 2,
            _ => 3,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Group::Point => "",
            Group::V => "v=",
            Group::W => "w=",
        }
    }
}

fn store(out: &mut AttributeMap, group: Group, values: &[String]) -> Result<()> {
    if values.is_empty() && group == Group::Point {
        return Err(ParseError::new("coords needs at least x and y"));
    }
    if values.len() < group.min_len() || values.len() > 4 {
        return Err(ParseError::new(format!(
            "coords {}group needs {} to 4 numbers, got {}",
            group.prefix(),
            group.min_len(),
            values.len()
        )));
    }
    let keys = group.keys();
    for (key, value) in keys.iter().zip(values) {
        out.insert(key.to_string(), value.clone());
    }
    let fill = if group == Group::Point { "1.0" } else { "0.0" };
    for key in &keys[values.len()..] {
        out.insert(key.to_string(), fill.to_string());
    }
    Ok(())
}

impl PropertyCodec for CoordsCodec {
    fn name(&self) -> &str {
        "coords"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        let mut group = Group::Point;
        let mut values: Vec<String> = Vec::new();
        let mut seen = Vec::new();

        for token in tokens::split_tokens(value)? {
            let (next, number) = match tokens::key_value(&token) {
                Some(("v", rest)) => (Some(Group::V), rest),
                Some(("w", rest)) => (Some(Group::W), rest),
                Some((key, _)) => {
                    return Err(ParseError::new(format!("unknown coords group '{}='", key)))
                }
                None => (None, token.as_str()),
            };
            if let Some(next) = next {
                if next == group || seen.contains(&next) {
                    return Err(ParseError::new(format!(
                        "duplicate coords group '{}'",
                        next.prefix()
                    )));
                }
                store(&mut out, group, &values)?;
                seen.push(group);
                group = next;
                values.clear();
            }
            tokens::number(number, "coords")?;
            values.push(number.to_string());
        }
        store(&mut out, group, &values)?;
        Ok(Some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let (x, y) = (get(attrs, "x")?, get(attrs, "y")?);
        let mut parts = vec![x.to_string(), y.to_string()];
        let z = get(attrs, "z").unwrap_or("1.0");
        match non_default(attrs, "w", "1.0") {
            Some(w) => {
                parts.push(z.to_string());
                parts.push(w.to_string());
            }
            None => parts.extend(non_default(attrs, "z", "1.0").map(str::to_string)),
        }
        for group in [Group::V, Group::W] {
            let [kx, ky, kz, kw] = group.keys();
            if let (Some(a), Some(b), Some(c)) = (get(attrs, kx), get(attrs, ky), get(attrs, kz)) {
                let mut text = format!("{}{} {} {}", group.prefix(), a, b, c);
                if let Some(d) = non_default(attrs, kw, "0.0") {
                    text.push(' ');
                    text.push_str(d);
                }
                parts.push(text);
            }
        }
        Some(parts.join(" "))
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("z", "1.0"), ("w", "1.0")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> AttributeMap {
        CoordsCodec.decode(value).unwrap().unwrap()
    }

    #[test]
    fn test_two_values_fill_z_and_w() {
        let attrs = decode("2.1 3.2");
        assert_eq!(attrs["x"], "2.1");
        assert_eq!(attrs["y"], "3.2");
        assert_eq!(attrs["z"], "1.0");
        assert_eq!(attrs["w"], "1.0");
        assert_eq!(CoordsCodec.encode(&attrs).as_deref(), Some("2.1 3.2"));
    }

    #[test]
    fn test_four_values() {
        let attrs = decode("2.3 4.1 3.5 2.1");
        assert_eq!(attrs["w"], "2.1");
        assert_eq!(CoordsCodec.encode(&attrs).as_deref(), Some("2.3 4.1 3.5 2.1"));
    }

    #[test]
    fn test_v_group_defaults_vw() {
        let attrs = decode("2.3 4.1 3.5 v=1.1 2.3 2.4");
        assert_eq!(attrs["z"], "3.5");
        assert_eq!(attrs["w"], "1.0");
        assert_eq!(attrs["vx"], "1.1");
        assert_eq!(attrs["vz"], "2.4");
        assert_eq!(attrs["vw"], "0.0");
        assert_eq!(
            CoordsCodec.encode(&attrs).as_deref(),
            Some("2.3 4.1 3.5 v=1.1 2.3 2.4")
        );
    }

    #[test]
    fn test_v_and_w_groups() {
        let text = "2.3 4.1 3.5 2.1 v=2.5 6.2 3.4 w=1.1 2.3 3.3";
        let attrs = decode(text);
        assert_eq!(attrs["wx"], "1.1");
        assert_eq!(attrs["ww"], "0.0");
        assert_eq!(CoordsCodec.encode(&attrs).as_deref(), Some(text));
    }

    #[test]
    fn test_vw_kept_when_set() {
        let text = "2.3 4.1 3.5 v=1.1 2.3 2.4 0.5";
        assert_eq!(CoordsCodec.encode(&decode(text)).as_deref(), Some(text));
    }

    #[test]
    fn test_invalid_input() {
        assert!(CoordsCodec.decode("1").is_err());
        assert!(CoordsCodec.decode("1 2 3 4 5").is_err());
        assert!(CoordsCodec.decode("1 2 v=1 2").is_err());
        assert!(CoordsCodec.decode("a b").is_err());
        assert!(CoordsCodec.decode("1 2 q=1 2 3").is_err());
    }
}
