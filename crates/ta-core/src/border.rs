use serde::{Deserialize, Serialize};

/// Out-of-range sample policy for 1D filtering.
///
/// The default is reflect-101 (`dcb|abcd|cba`), which mirrors around the edge
/// sample without repeating it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode<T> {
    Clamp,
    Constant(T),
    #[default]
    Reflect101,
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// Returns `None` for an empty range and for [`BorderMode::Constant`], whose
/// out-of-range samples are the fill value rather than a source index.
pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match mode {
        BorderMode::Constant(_) => None,
        BorderMode::Clamp => Some(i.clamp(0, len as isize - 1) as usize),
        BorderMode::Reflect101 => {
            if len == 1 {
                return Some(0);
            }
            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { Some(r) } else { Some(period as usize - r) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BorderMode, map_index};

    #[test]
    fn clamp_saturates_both_ends() {
        let mode = BorderMode::<f32>::Clamp;
        assert_eq!(map_index(-2, 4, &mode), Some(0));
        assert_eq!(map_index(2, 4, &mode), Some(2));
        assert_eq!(map_index(9, 4, &mode), Some(3));
        assert_eq!(map_index(0, 0, &mode), None);
    }

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        let mode = BorderMode::<f32>::Reflect101;
        // len 5: ... 2 1 | 0 1 2 3 4 | 3 2 ...
        let cases = [(-2, 2), (-1, 1), (0, 0), (4, 4), (5, 3), (6, 2)];
        for (i, expected) in cases {
            assert_eq!(map_index(i, 5, &mode), Some(expected), "index {i}");
        }
        for i in -3..=3 {
            assert_eq!(map_index(i, 1, &mode), Some(0));
        }
    }

    #[test]
    fn constant_never_maps() {
        assert_eq!(map_index(1, 4, &BorderMode::Constant(0.0f32)), None);
        assert_eq!(BorderMode::<f32>::default(), BorderMode::Reflect101);
    }
}
