//! Static HTML pages served by the billing endpoints.

pub const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>WallSt Subscription</title>
</head>
<body>
  <h1>Subscribe</h1>
  <form method="post" action="/create-subscription">
    <label>Name <input type="text" name="name" required></label>
    <label>Email <input type="email" name="email" required></label>
    <label>Card number <input type="text" name="cardNumber" autocomplete="cc-number" required></label>
    <label>Expiry month <input type="text" name="expiryMonth" autocomplete="cc-exp-month" required></label>
    <label>Expiry year <input type="text" name="expiryYear" autocomplete="cc-exp-year" required></label>
    <label>CVC <input type="text" name="cvc" autocomplete="cc-csc" required></label>
    <input type="hidden" name="pricePlan" value="standard">
    <button type="submit">Subscribe</button>
  </form>
</body>
</html>
"#;

pub const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Subscription started</title>
</head>
<body>
  <h1>Thank you!</h1>
  <p>Your subscription has been created.</p>
  <a href="/">Back</a>
</body>
</html>
"#;

pub const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Subscription failed</title>
</head>
<body>
  <h1>Something went wrong</h1>
  <p>We could not create your subscription. Please try again.</p>
  <a href="/">Back</a>
</body>
</html>
"#;
