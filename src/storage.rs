//! In-memory mock store for users, hosted properties, bookings,
//! notifications and payments. Process lifetime only, seeded on construction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: String,
    pub is_host: bool,
    pub created_at: DateTime<Utc>,
}

/// Account to create; the password is already hashed by the caller
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub is_host: Option<bool>,
}

/// Host-managed listing, separate from the dataset-backed properties
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedProperty {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_night: f64,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub host_id: String,
    pub rating: f64,
    pub review_count: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_night: f64,
    pub max_guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub host_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub max_guests: Option<u32>,
    pub images: Option<Vec<String>>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub guest_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub property_id: String,
    pub guest_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    #[serde(default = "pending")]
    pub status: BookingStatus,
}

fn pending() -> BookingStatus {
    BookingStatus::Pending
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub guests: Option<u32>,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub booking_id: String,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPatch {
    pub amount: Option<f64>,
    pub status: Option<PaymentStatus>,
}

/// Keyed records per kind. Missing ids give `None`, never an error.
pub struct MemStorage {
    users: RwLock<HashMap<String, User>>,
    properties: RwLock<HashMap<String, HostedProperty>>,
    bookings: RwLock<HashMap<String, Booking>>,
    notifications: RwLock<HashMap<String, Notification>>,
    payments: RwLock<HashMap<String, Payment>>,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    /// Store seeded with a sample host, guest and three listings
    pub fn new() -> Self {
        let now = Utc::now();
        let users = seed_users(now)
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let properties = seed_properties(now)
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Self {
            users: RwLock::new(users),
            properties: RwLock::new(properties),
            bookings: RwLock::new(HashMap::new()),
            notifications: RwLock::new(HashMap::new()),
            payments: RwLock::new(HashMap::new()),
        }
    }

    // Users

    pub async fn get_user(&self, id: &str) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn create_user(&self, new: NewUser) -> User {
        let user = User {
            id: new_id(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            avatar: String::new(),
            is_host: false,
            created_at: Utc::now(),
        };
        self.users.write().await.insert(user.id.clone(), user.clone());
        user
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Option<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id)?;

        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = avatar;
        }
        if let Some(is_host) = patch.is_host {
            user.is_host = is_host;
        }

        Some(user.clone())
    }

    // Hosted properties

    /// Active listings, newest first
    pub async fn list_properties(&self, limit: usize, offset: usize) -> Vec<HostedProperty> {
        let mut active: Vec<HostedProperty> = self
            .properties
            .read()
            .await
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();

        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        active.into_iter().skip(offset).take(limit).collect()
    }

    pub async fn get_property(&self, id: &str) -> Option<HostedProperty> {
        self.properties.read().await.get(id).cloned()
    }

    pub async fn properties_by_host(&self, host_id: &str) -> Vec<HostedProperty> {
        self.properties
            .read()
            .await
            .values()
            .filter(|p| p.host_id == host_id)
            .cloned()
            .collect()
    }

    pub async fn create_property(&self, new: NewProperty) -> HostedProperty {
        let property = HostedProperty {
            id: new_id(),
            title: new.title,
            description: new.description,
            location: new.location,
            latitude: new.latitude,
            longitude: new.longitude,
            price_per_night: new.price_per_night,
            max_guests: new.max_guests,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            images: new.images,
            amenities: new.amenities,
            host_id: new.host_id,
            rating: 0.0,
            review_count: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        self.properties
            .write()
            .await
            .insert(property.id.clone(), property.clone());
        property
    }

    pub async fn update_property(&self, id: &str, patch: PropertyPatch) -> Option<HostedProperty> {
        let mut properties = self.properties.write().await;
        let property = properties.get_mut(id)?;

        if let Some(title) = patch.title {
            property.title = title;
        }
        if let Some(description) = patch.description {
            property.description = description;
        }
        if let Some(price) = patch.price_per_night {
            property.price_per_night = price;
        }
        if let Some(max_guests) = patch.max_guests {
            property.max_guests = max_guests;
        }
        if let Some(images) = patch.images {
            property.images = images;
        }
        if let Some(amenities) = patch.amenities {
            property.amenities = amenities;
        }
        if let Some(is_active) = patch.is_active {
            property.is_active = is_active;
        }

        Some(property.clone())
    }

    // Bookings

    pub async fn get_booking(&self, id: &str) -> Option<Booking> {
        self.bookings.read().await.get(id).cloned()
    }

    pub async fn bookings_by_user(&self, guest_id: &str) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .values()
            .filter(|b| b.guest_id == guest_id)
            .cloned()
            .collect()
    }

    pub async fn bookings_by_property(&self, property_id: &str) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .values()
            .filter(|b| b.property_id == property_id)
            .cloned()
            .collect()
    }

    pub async fn create_booking(&self, new: NewBooking) -> Booking {
        let booking = Booking {
            id: new_id(),
            property_id: new.property_id,
            guest_id: new.guest_id,
            check_in: new.check_in,
            check_out: new.check_out,
            guests: new.guests,
            total_price: new.total_price,
            status: new.status,
            created_at: Utc::now(),
        };
        self.bookings
            .write()
            .await
            .insert(booking.id.clone(), booking.clone());
        booking
    }

    pub async fn update_booking(&self, id: &str, patch: BookingPatch) -> Option<Booking> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings.get_mut(id)?;

        if let Some(check_in) = patch.check_in {
            booking.check_in = check_in;
        }
        if let Some(check_out) = patch.check_out {
            booking.check_out = check_out;
        }
        if let Some(guests) = patch.guests {
            booking.guests = guests;
        }
        if let Some(total_price) = patch.total_price {
            booking.total_price = total_price;
        }
        if let Some(status) = patch.status {
            booking.status = status;
        }

        Some(booking.clone())
    }

    // Notifications

    /// Newest first
    pub async fn notifications_by_user(&self, user_id: &str) -> Vec<Notification> {
        let mut found: Vec<Notification> = self
            .notifications
            .read()
            .await
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    pub async fn create_notification(&self, new: NewNotification) -> Notification {
        let notification = Notification {
            id: new_id(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications
            .write()
            .await
            .insert(notification.id.clone(), notification.clone());
        notification
    }

    /// False when no such notification exists
    pub async fn mark_notification_read(&self, id: &str) -> bool {
        match self.notifications.write().await.get_mut(id) {
            Some(notification) => {
                notification.is_read = true;
                true
            }
            None => false,
        }
    }

    // Payments

    pub async fn get_payment(&self, id: &str) -> Option<Payment> {
        self.payments.read().await.get(id).cloned()
    }

    pub async fn payments_by_booking(&self, booking_id: &str) -> Vec<Payment> {
        self.payments
            .read()
            .await
            .values()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect()
    }

    pub async fn create_payment(&self, new: NewPayment) -> Payment {
        let payment = Payment {
            id: new_id(),
            booking_id: new.booking_id,
            amount: new.amount,
            method: new.method,
            status: new.status,
            created_at: Utc::now(),
        };
        self.payments
            .write()
            .await
            .insert(payment.id.clone(), payment.clone());
        payment
    }

    pub async fn update_payment(&self, id: &str, patch: PaymentPatch) -> Option<Payment> {
        let mut payments = self.payments.write().await;
        let payment = payments.get_mut(id)?;

        if let Some(amount) = patch.amount {
            payment.amount = amount;
        }
        if let Some(status) = patch.status {
            payment.status = status;
        }

        Some(payment.clone())
    }
}

// Not a valid bcrypt hash, so seeded accounts cannot log in
const SEED_PASSWORD_HASH: &str = "hashedpassword";

fn seed_users(now: DateTime<Utc>) -> Vec<User> {
    vec![
        User {
            id: "host-1".to_string(),
            email: "sarah@example.com".to_string(),
            password_hash: SEED_PASSWORD_HASH.to_string(),
            first_name: "Sarah".to_string(),
            last_name: "Johnson".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
            avatar: String::new(),
            is_host: true,
            created_at: now,
        },
        User {
            id: "guest-1".to_string(),
            email: "john@example.com".to_string(),
            password_hash: SEED_PASSWORD_HASH.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: Some("+1 (555) 987-6543".to_string()),
            avatar: String::new(),
            is_host: false,
            created_at: now,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed_property(
    id: &str,
    title: &str,
    description: &str,
    location: &str,
    coordinates: (f64, f64),
    price_per_night: f64,
    rooms: (u32, u32, u32),
    images: &[&str],
    amenities: &[&str],
    rating: (f64, u32),
    created_at: DateTime<Utc>,
) -> HostedProperty {
    let (max_guests, bedrooms, bathrooms) = rooms;
    HostedProperty {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        latitude: Some(coordinates.0),
        longitude: Some(coordinates.1),
        price_per_night,
        max_guests,
        bedrooms,
        bathrooms,
        images: images.iter().map(|s| s.to_string()).collect(),
        amenities: amenities.iter().map(|s| s.to_string()).collect(),
        host_id: "host-1".to_string(),
        rating: rating.0,
        review_count: rating.1,
        is_active: true,
        created_at,
    }
}

fn seed_properties(now: DateTime<Utc>) -> Vec<HostedProperty> {
    vec![
        seed_property(
            "prop-1",
            "Beachfront Villa in Malibu",
            "Beachfront villa with floor-to-ceiling windows, an infinity pool and direct beach access.",
            "Malibu, California",
            (34.0259, -118.7798),
            299.0,
            (8, 4, 3),
            &[
                "https://images.unsplash.com/photo-1582268611958-ebfd161ef9cf?auto=format&fit=crop&w=800&h=600",
                "https://images.unsplash.com/photo-1616486338812-3dadae4b4ace?auto=format&fit=crop&w=600&h=400",
            ],
            &["Pool", "WiFi", "Kitchen", "Parking", "TV", "Air conditioning"],
            (4.95, 127),
            now,
        ),
        seed_property(
            "prop-2",
            "Cozy Mountain Cabin",
            "Mountain cabin surrounded by hiking trails.",
            "Aspen, Colorado",
            (39.1911, -106.8175),
            189.0,
            (6, 3, 2),
            &["https://images.unsplash.com/photo-1449824913935-59a10b8d2000?auto=format&fit=crop&w=800&h=600"],
            &["WiFi", "Kitchen", "Fireplace", "Parking"],
            (4.87, 89),
            now,
        ),
        seed_property(
            "prop-3",
            "Modern Downtown Loft",
            "Loft in the heart of the city with floor-to-ceiling windows.",
            "New York, NY",
            (40.7128, -74.0060),
            159.0,
            (4, 2, 2),
            &["https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?auto=format&fit=crop&w=800&h=600"],
            &["WiFi", "Kitchen", "Gym", "Parking"],
            (4.92, 156),
            now,
        ),
    ]
}
