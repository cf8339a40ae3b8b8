use crate::models::KeyMoment;

/// Order key moments by timestamp ascending for display.
///
/// The sort is stable: moments sharing a timestamp keep their insertion
/// order, so repeated renders of the same call are identical.
pub fn order_moments(moments: &[KeyMoment]) -> Vec<KeyMoment> {
    let mut ordered = moments.to_vec();
    order_moments_in_place(&mut ordered);
    ordered
}

/// In-place variant of [`order_moments`].
pub fn order_moments_in_place(moments: &mut [KeyMoment]) {
    moments.sort_by_key(|m| m.timestamp_secs);
}
