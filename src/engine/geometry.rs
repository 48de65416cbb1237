#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct RowGeometry {
    pub code: String,
    pub client_top: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListSnapshot {
    pub list_top: f32,
    pub scroll_top: f32,
    pub rows: Vec<RowGeometry>,
}

impl ListSnapshot {
    pub fn to_local(&self, client_y: f32) -> f32 {
        client_y - self.list_top + self.scroll_top
    }

    pub fn to_client(&self, local_y: f32) -> f32 {
        local_y + self.list_top - self.scroll_top
    }

    pub(crate) fn measure(&self) -> Vec<ListItem> {
        self.rows
            .iter()
            .map(|row| ListItem {
                code: row.code.clone(),
                top: self.to_local(row.client_top),
                height: row.height.max(0.0),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    pub code: String,
    pub top: f32,
    pub height: f32,
}

impl ListItem {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> f32 {
        self.top + (self.height * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub top: f32,
    pub height: f32,
}

impl Band {
    pub fn between(a: f32, b: f32) -> Self {
        let top = a.min(b);
        Self {
            top,
            height: (a.max(b) - top).max(0.0),
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub min: f32,
    pub max: f32,
}

impl Limits {
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{ListSnapshot, RowGeometry};

    pub const ROW_HEIGHT: f32 = 24.0;

    pub fn snapshot(codes: &[&str]) -> ListSnapshot {
        scrolled_snapshot(codes, 100.0, 0.0)
    }

    pub fn scrolled_snapshot(codes: &[&str], list_top: f32, scroll_top: f32) -> ListSnapshot {
        ListSnapshot {
            list_top,
            scroll_top,
            rows: codes
                .iter()
                .enumerate()
                .map(|(index, code)| RowGeometry {
                    code: (*code).to_owned(),
                    client_top: list_top - scroll_top + (index as f32 * ROW_HEIGHT),
                    height: ROW_HEIGHT,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{ROW_HEIGHT, scrolled_snapshot};
    use super::*;

    #[test]
    fn measure_is_independent_of_scroll() {
        let codes = ["A", "B", "C"];
        let plain = scrolled_snapshot(&codes, 40.0, 0.0).measure();
        let scrolled = scrolled_snapshot(&codes, 40.0, 30.0).measure();
        assert_eq!(plain, scrolled);
        assert_eq!(plain[2].top, 2.0 * ROW_HEIGHT);
        assert_eq!(plain[2].center(), 2.5 * ROW_HEIGHT);
    }

    #[test]
    fn client_and_local_coordinates_round_trip() {
        let snapshot = scrolled_snapshot(&["A"], 120.0, 18.0);
        let local = snapshot.to_local(200.0);
        assert_eq!(local, 98.0);
        assert_eq!(snapshot.to_client(local), 200.0);
    }

    #[test]
    fn band_between_orders_its_endpoints() {
        let band = Band::between(50.0, 10.0);
        assert_eq!(band.top, 10.0);
        assert_eq!(band.bottom(), 50.0);
    }
}
